//! Incremental constraint evaluation with node sharing for StreamForge.
//!
//! This crate provides the constraint stream engine:
//! - A fluent, typed stream API (`ConstraintFactory`, `ConstraintStream`)
//! - A declaration graph where structurally equal nodes are shared
//! - Sessions that propagate fact changes through a ranked node network
//!
//! # Architecture
//!
//! Streams are typed at the API surface and erased inside the network:
//! tuples carry rows of `Arc<dyn ColumnValue>` columns, and only the
//! changes staged since the previous score calculation are propagated.

// Erased closure tables and node maps spell out long types
#![allow(clippy::type_complexity)]

// Core modules
pub mod api;
pub mod graph;
pub mod row;
pub mod session;
pub mod stream;
pub mod value;

// ============================================================================
// Fluent Constraint Stream API
// ============================================================================

pub use stream::{
    Constraint, ConstraintBuilder, ConstraintFactory, ConstraintStream, GroupSpec, Joiner,
};

// ============================================================================
// Declaration Graph
// ============================================================================

pub use graph::{DeclId, DeclarationGraph, DeclarationKey, OpKind, Side};

// ============================================================================
// Sessions
// ============================================================================

pub use session::{
    ConstraintSession, ConstraintSessionFactory, ConstraintTotal, FactSet,
    SessionFactoryBuilder, TupleState,
};

// ============================================================================
// Analysis and Weight Overrides
// ============================================================================

pub use api::analysis::{
    ConstraintAnalysis, ConstraintJustification, DetailedConstraintMatch, EntityRef, Indictment,
    IndictmentMap, ScoreExplanation,
};
pub use api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};

// ============================================================================
// Erased Values
// ============================================================================

pub use row::RowType;
pub use value::{ColumnValue, Key, Value};
