//! StreamForge Core - Core types and traits for incremental constraint evaluation
//!
//! This crate provides the fundamental abstractions for StreamForge:
//! - Score types for representing solution quality
//! - Domain traits and the domain model consulted by source selections
//! - Constraint identification and match weights
//! - The workspace-wide error type

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType, MatchWeight};
pub use domain::{DomainModel, Fact, FactClass, FactKind, PlanningId};
pub use error::{Result, StreamForgeError};
pub use score::{
    HardSoftDecimalScore, HardSoftScore, ParseableScore, Score, ScoreLevel, ScoreParseError,
    SimpleScore,
};
