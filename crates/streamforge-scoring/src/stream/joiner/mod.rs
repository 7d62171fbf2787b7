//! Joiners for `join` and the existence operations.
//!
//! A joiner relates the tuple of the left stream to the single column of the
//! right stream. Equality joiners become index keys of the runtime node;
//! every other joiner is a residual predicate over the combined tuple.
//!
//! ```
//! use std::sync::Arc;
//!
//! use streamforge_core::{DomainModel, PlanningId, SimpleScore};
//! use streamforge_scoring::stream::joiner::{equal, less_than};
//! use streamforge_scoring::ConstraintFactory;
//!
//! #[derive(Debug)]
//! struct Shift { id: u32, employee: u32, start: i64, end: i64 }
//!
//! impl PlanningId for Shift {
//!     type Id = u32;
//!     fn planning_id(&self) -> u32 { self.id }
//! }
//!
//! let domain = DomainModel::new().with_problem_fact::<Shift>();
//! let factory = ConstraintFactory::<SimpleScore>::new(Arc::new(domain));
//! let shifts = factory.for_each::<Shift>().unwrap();
//!
//! // Same employee, and the left shift ends before the right one starts.
//! let sequential = shifts
//!     .join(
//!         shifts,
//!         equal(|s: &Shift| s.employee).and(less_than(|s: &Shift| s.end, |s: &Shift| s.start)),
//!     )
//!     .unwrap();
//! # let _ = sequential;
//! ```

mod comparison;
mod equal;
mod filtering;
mod overlapping;

#[cfg(test)]
mod tests;

use crate::graph::{KeyPart, ParamId, RowPredicate};
use crate::row::RowType;
use crate::value::ColumnValue;

pub use comparison::{
    greater_than, greater_than_or_equal, less_than, less_than_or_equal, ComparisonJoiner,
};
pub use equal::{equal, equal_bi, EqualJoiner};
pub use filtering::{filtering, FilteringJoiner};
pub use overlapping::{overlapping, OverlappingJoiner};

/// A matching condition between a left tuple `T` and a right column `B`.
///
/// `()` is the empty joiner: every left tuple matches every right one.
pub trait Joiner<T, B>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_parts(self) -> JoinerParts;
}

/// Erased form of a joiner.
#[doc(hidden)]
#[derive(Default)]
pub struct JoinerParts {
    pub(crate) left: Vec<KeyPart>,
    pub(crate) right: Vec<KeyPart>,
    pub(crate) filters: Vec<RowPredicate>,
    pub(crate) params: Vec<ParamId>,
}

impl JoinerParts {
    fn merge(mut self, other: JoinerParts) -> Self {
        self.left.extend(other.left);
        self.right.extend(other.right);
        self.filters.extend(other.filters);
        self.params.extend(other.params);
        self
    }
}

impl<T: RowType, B: ColumnValue> Joiner<T, B> for () {
    fn into_parts(self) -> JoinerParts {
        JoinerParts::default()
    }
}

/// Both joiners must match.
pub struct AndJoiner<J1, J2> {
    first: J1,
    second: J2,
}

impl<J1, J2> AndJoiner<J1, J2> {
    pub fn new(first: J1, second: J2) -> Self {
        Self { first, second }
    }

    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<T, B, J1, J2> Joiner<T, B> for AndJoiner<J1, J2>
where
    J1: Joiner<T, B>,
    J2: Joiner<T, B>,
{
    fn into_parts(self) -> JoinerParts {
        let mut parts = JoinerParts {
            params: vec![ParamId::Label("and")],
            ..JoinerParts::default()
        };
        parts = parts.merge(self.first.into_parts());
        parts.merge(self.second.into_parts())
    }
}
