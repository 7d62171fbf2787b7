//! StreamForge - Incremental Constraint Evaluation in Rust
//!
//! Declare constraints as streams over your facts, build a session, and
//! re-score cheaply after every change.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use streamforge::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Task {
//!     id: u32,
//!     minutes: u32,
//! }
//!
//! impl PlanningId for Task {
//!     type Id = u32;
//!     fn planning_id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! let domain = DomainModel::new().with_problem_fact::<Task>();
//! let factory = ConstraintSessionFactory::<SimpleScore>::new(domain, |cf| {
//!     Ok(vec![cf
//!         .for_each::<Task>()?
//!         .filter(|t: &Task| t.minutes > 60)?
//!         .penalize(SimpleScore::of(1))
//!         .as_constraint("Long task")?])
//! })?;
//!
//! let mut session = factory.build_default_session()?;
//! session.insert(Arc::new(Task { id: 1, minutes: 90 }))?;
//! assert_eq!(session.calculate_score()?, SimpleScore::of(-1));
//!
//! session.update(Arc::new(Task { id: 1, minutes: 30 }))?;
//! assert_eq!(session.calculate_score()?, SimpleScore::of(0));
//! # Ok::<(), StreamForgeError>(())
//! ```

// Score types
pub use streamforge_core::score::{
    HardSoftDecimalScore, HardSoftScore, ParseableScore, Score, SimpleScore,
};

// Domain and errors
pub use streamforge_core::{
    ConstraintRef, DomainModel, Fact, ImpactType, PlanningId, Result, StreamForgeError,
};

// Configuration
pub use streamforge_config::{EngineConfig, EnvironmentMode};

// Constraint stream API
pub use streamforge_scoring::stream;
pub use streamforge_scoring::{Constraint, ConstraintFactory, ConstraintStream};

// Sessions and analysis
pub use streamforge_scoring::{
    ConstraintAnalysis, ConstraintJustification, ConstraintSession, ConstraintSessionFactory,
    ConstraintTotal, ConstraintWeightOverrides, EntityRef, FactSet, IndictmentMap,
    ScoreExplanation,
};

pub mod prelude {
    pub use super::stream::collector::{
        average, count, count_distinct, max, min, sum, to_list, to_set,
    };
    pub use super::stream::joiner::{
        equal, equal_bi, filtering, greater_than, less_than, overlapping,
    };
    pub use super::stream::key;
    pub use super::{
        ConstraintFactory, ConstraintSessionFactory, DomainModel, FactSet, HardSoftScore,
        PlanningId, Score, SimpleScore, StreamForgeError,
    };
}
