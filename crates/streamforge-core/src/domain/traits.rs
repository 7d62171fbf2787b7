//! Core domain traits for facts in working memory.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for types that have a unique planning identifier.
///
/// Two instances of the same type with equal ids denote the same fact; an
/// updated fact is handed to the engine as a new instance with the same id.
///
/// # Example
///
/// ```
/// use streamforge_core::PlanningId;
///
/// #[derive(Debug)]
/// struct Meeting {
///     id: u64,
///     room: Option<char>,
/// }
///
/// impl PlanningId for Meeting {
///     type Id = u64;
///     fn planning_id(&self) -> u64 {
///         self.id
///     }
/// }
///
/// assert_eq!(Meeting { id: 7, room: None }.planning_id(), 7);
/// ```
pub trait PlanningId {
    /// The type of the unique identifier.
    type Id: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    /// Returns the unique identifier for this object.
    fn planning_id(&self) -> Self::Id;
}

/// A value that can live in working memory: problem facts and planning
/// entities alike.
///
/// Implemented automatically for every `PlanningId` type that is
/// `Debug + Send + Sync + 'static`.
pub trait Fact: PlanningId + Debug + Send + Sync + 'static {}

impl<T> Fact for T where T: PlanningId + Debug + Send + Sync + 'static {}
