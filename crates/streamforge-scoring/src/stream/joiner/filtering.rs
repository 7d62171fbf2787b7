//! Arbitrary predicate joiner.

use std::sync::Arc;

use super::{AndJoiner, Joiner, JoinerParts};
use crate::graph::{ClosureId, ParamId, RowPredicate};
use crate::row::{Append, RowFn};
use crate::value::{ColumnValue, Value};

/// Matches when `predicate` holds for the left columns followed by the
/// right column, e.g. `|a: &A, b: &B| ..` for a uni join.
///
/// Filtering joiners cannot use the index; prefer [`equal`](super::equal)
/// where possible.
pub fn filtering<F>(predicate: F) -> FilteringJoiner<F> {
    FilteringJoiner { predicate }
}

pub struct FilteringJoiner<F> {
    predicate: F,
}

impl<F> FilteringJoiner<F> {
    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<T, B, F> Joiner<T, B> for FilteringJoiner<F>
where
    T: Append<B>,
    B: ColumnValue,
    F: RowFn<T::Output, bool>,
{
    fn into_parts(self) -> JoinerParts {
        let params = vec![
            ParamId::Label("filtering"),
            ParamId::Closure(ClosureId::of::<F>()),
        ];
        let predicate = self.predicate;
        let filter: RowPredicate = Arc::new(move |row: &[Value]| predicate.apply(row));
        JoinerParts {
            filters: vec![filter],
            params,
            ..JoinerParts::default()
        }
    }
}
