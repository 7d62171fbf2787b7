//! Ordering joiners.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{AndJoiner, Joiner, JoinerParts};
use crate::graph::{ClosureId, ParamId, RowPredicate};
use crate::row::{RowFn, RowType};
use crate::value::{ColumnValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparison {
    fn label(self) -> &'static str {
        match self {
            Comparison::Less => "less_than",
            Comparison::LessOrEqual => "less_than_or_equal",
            Comparison::Greater => "greater_than",
            Comparison::GreaterOrEqual => "greater_than_or_equal",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Less => ordering.is_lt(),
            Comparison::LessOrEqual => ordering.is_le(),
            Comparison::Greater => ordering.is_gt(),
            Comparison::GreaterOrEqual => ordering.is_ge(),
        }
    }
}

/// Matches when `left(tuple)` compares to `right(b)` as required.
pub struct ComparisonJoiner<FL, FR, K> {
    left: FL,
    right: FR,
    comparison: Comparison,
    _key: PhantomData<fn() -> K>,
}

fn comparison<FL, FR, K>(
    left: FL,
    right: FR,
    comparison: Comparison,
) -> ComparisonJoiner<FL, FR, K> {
    ComparisonJoiner {
        left,
        right,
        comparison,
        _key: PhantomData,
    }
}

/// Matches when `left(tuple) < right(b)`.
pub fn less_than<FL, FR, K>(left: FL, right: FR) -> ComparisonJoiner<FL, FR, K> {
    comparison(left, right, Comparison::Less)
}

/// Matches when `left(tuple) <= right(b)`.
pub fn less_than_or_equal<FL, FR, K>(left: FL, right: FR) -> ComparisonJoiner<FL, FR, K> {
    comparison(left, right, Comparison::LessOrEqual)
}

/// Matches when `left(tuple) > right(b)`.
pub fn greater_than<FL, FR, K>(left: FL, right: FR) -> ComparisonJoiner<FL, FR, K> {
    comparison(left, right, Comparison::Greater)
}

/// Matches when `left(tuple) >= right(b)`.
pub fn greater_than_or_equal<FL, FR, K>(left: FL, right: FR) -> ComparisonJoiner<FL, FR, K> {
    comparison(left, right, Comparison::GreaterOrEqual)
}

impl<FL, FR, K> ComparisonJoiner<FL, FR, K> {
    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<T, B, FL, FR, K> Joiner<T, B> for ComparisonJoiner<FL, FR, K>
where
    T: RowType,
    B: ColumnValue,
    FL: RowFn<T, K>,
    FR: RowFn<(B,), K>,
    K: Ord + 'static,
{
    fn into_parts(self) -> JoinerParts {
        let params = vec![
            ParamId::Label(self.comparison.label()),
            ParamId::Closure(ClosureId::of::<FL>()),
            ParamId::Closure(ClosureId::of::<FR>()),
        ];
        let ComparisonJoiner {
            left,
            right,
            comparison,
            ..
        } = self;
        let filter: RowPredicate = Arc::new(move |row: &[Value]| {
            let (l, r) = row.split_at(T::WIDTH);
            comparison.accepts(left.apply(l).cmp(&right.apply(r)))
        });
        JoinerParts {
            filters: vec![filter],
            params,
            ..JoinerParts::default()
        }
    }
}
