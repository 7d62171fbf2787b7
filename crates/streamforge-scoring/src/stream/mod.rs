//! Fluent constraint stream API.
//!
//! A [`ConstraintFactory`] hands out typed [`ConstraintStream`]s. Each
//! operation declares a node in the factory's graph, reusing an existing
//! node when an equal one was already declared, and finishing a stream with
//! `penalize`/`reward` plus `as_constraint` registers a constraint.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use streamforge_core::{DomainModel, PlanningId, SimpleScore};
//! use streamforge_scoring::stream::joiner::equal_bi;
//! use streamforge_scoring::ConstraintFactory;
//!
//! #[derive(Debug)]
//! struct Room { id: char, capacity: u32 }
//!
//! #[derive(Debug)]
//! struct Meeting { id: u32, room: Option<char>, attendees: u32 }
//!
//! impl PlanningId for Room {
//!     type Id = char;
//!     fn planning_id(&self) -> char { self.id }
//! }
//!
//! impl PlanningId for Meeting {
//!     type Id = u32;
//!     fn planning_id(&self) -> u32 { self.id }
//! }
//!
//! let domain = DomainModel::new()
//!     .with_problem_fact::<Room>()
//!     .with_planning_entity(|m: &Meeting| m.room.is_some());
//! let factory = ConstraintFactory::<SimpleScore>::new(Arc::new(domain));
//!
//! let room_capacity = factory
//!     .for_each::<Meeting>()
//!     .unwrap()
//!     .join(
//!         factory.for_each::<Room>().unwrap(),
//!         equal_bi(|m: &Meeting| m.room, |r: &Room| Some(r.id)),
//!     )
//!     .unwrap()
//!     .filter(|m: &Meeting, r: &Room| m.attendees > r.capacity)
//!     .unwrap()
//!     .penalize_weighted(SimpleScore::of(1), |m: &Meeting, r: &Room| {
//!         (m.attendees - r.capacity) as i64
//!     })
//!     .as_constraint("Room capacity")
//!     .unwrap();
//!
//! assert_eq!(room_capacity.name(), "Room capacity");
//! ```
//!
//! # Architecture
//!
//! ```text
//! ConstraintFactory::new(domain)
//!     .for_each::<A>()         -> ConstraintStream<(A,)>      source node
//!     .join(other, joiner)     -> ConstraintStream<(A, B)>    fore bridges + join + aft bridge
//!     .filter(predicate)       -> ConstraintStream<(A, B)>    filter node
//!     .penalize(weight)        -> ConstraintBuilder<(A, B)>
//!     .as_constraint(name)     -> Constraint                  score node
//! ```

mod arity_stream_macros;
mod builder;
pub mod collector;
mod constraint_stream;
mod factory;
pub mod group_spec;
pub mod joiner;

pub use builder::{Constraint, ConstraintBuilder};
pub use constraint_stream::ConstraintStream;
pub use factory::ConstraintFactory;
pub use group_spec::{key, GroupKey, GroupPart, GroupSpec};
pub use joiner::Joiner;
