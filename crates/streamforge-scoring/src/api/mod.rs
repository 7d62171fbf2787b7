//! Result and configuration types shared by sessions and factories:
//! score analysis and runtime weight overrides.

pub mod analysis;
pub mod weight_overrides;

#[cfg(test)]
mod analysis_tests;

pub use analysis::{
    ConstraintAnalysis, ConstraintJustification, DetailedConstraintMatch, EntityRef, Indictment,
    IndictmentMap, ScoreExplanation,
};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};
