//! Interval overlap joiner.

use std::marker::PhantomData;
use std::sync::Arc;

use super::{AndJoiner, Joiner, JoinerParts};
use crate::graph::{ClosureId, ParamId, RowPredicate};
use crate::row::{RowFn, RowType};
use crate::value::{ColumnValue, Value};

/// Matches when the half-open intervals `[left_start, left_end)` and
/// `[right_start, right_end)` overlap. Touching intervals do not overlap.
pub fn overlapping<FLS, FLE, FRS, FRE, K>(
    left_start: FLS,
    left_end: FLE,
    right_start: FRS,
    right_end: FRE,
) -> OverlappingJoiner<FLS, FLE, FRS, FRE, K> {
    OverlappingJoiner {
        left_start,
        left_end,
        right_start,
        right_end,
        _key: PhantomData,
    }
}

pub struct OverlappingJoiner<FLS, FLE, FRS, FRE, K> {
    left_start: FLS,
    left_end: FLE,
    right_start: FRS,
    right_end: FRE,
    _key: PhantomData<fn() -> K>,
}

impl<FLS, FLE, FRS, FRE, K> OverlappingJoiner<FLS, FLE, FRS, FRE, K> {
    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<T, B, FLS, FLE, FRS, FRE, K> Joiner<T, B> for OverlappingJoiner<FLS, FLE, FRS, FRE, K>
where
    T: RowType,
    B: ColumnValue,
    FLS: RowFn<T, K>,
    FLE: RowFn<T, K>,
    FRS: RowFn<(B,), K>,
    FRE: RowFn<(B,), K>,
    K: Ord + 'static,
{
    fn into_parts(self) -> JoinerParts {
        let params = vec![
            ParamId::Label("overlapping"),
            ParamId::Closure(ClosureId::of::<FLS>()),
            ParamId::Closure(ClosureId::of::<FLE>()),
            ParamId::Closure(ClosureId::of::<FRS>()),
            ParamId::Closure(ClosureId::of::<FRE>()),
        ];
        let OverlappingJoiner {
            left_start,
            left_end,
            right_start,
            right_end,
            ..
        } = self;
        let filter: RowPredicate = Arc::new(move |row: &[Value]| {
            let (l, r) = row.split_at(T::WIDTH);
            left_start.apply(l) < right_end.apply(r) && right_start.apply(r) < left_end.apply(l)
        });
        JoinerParts {
            filters: vec![filter],
            params,
            ..JoinerParts::default()
        }
    }
}
