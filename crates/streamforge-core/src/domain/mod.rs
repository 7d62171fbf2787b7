//! Domain model types for working-memory facts.
//!
//! The engine never owns fact identity; it only needs to know, per fact type,
//! how to identify an instance and whether a planning entity is fully
//! assigned (which controls the default filtering of a bare source selection).

mod model;
mod traits;

#[cfg(test)]
mod tests;

pub use model::{DomainModel, FactClass, FactKind};
pub use traits::{Fact, PlanningId};
