//! Equality joiners, evaluated through the node's hash index.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{AndJoiner, Joiner, JoinerParts};
use crate::graph::{ClosureId, KeyPart, ParamId};
use crate::row::{RowFn, RowType};
use crate::value::{ColumnValue, Key, Value};

/// Matches when the same mapping gives equal keys on both sides.
///
/// Only usable when the left stream is uni and of the same type as the
/// right stream; otherwise use [`equal_bi`].
pub fn equal<F, K>(mapping: F) -> EqualJoiner<F, F, K>
where
    F: Clone,
{
    EqualJoiner {
        left: mapping.clone(),
        right: mapping,
        _key: PhantomData,
    }
}

/// Matches when `left(tuple) == right(b)`.
pub fn equal_bi<FL, FR, K>(left: FL, right: FR) -> EqualJoiner<FL, FR, K> {
    EqualJoiner {
        left,
        right,
        _key: PhantomData,
    }
}

pub struct EqualJoiner<FL, FR, K> {
    left: FL,
    right: FR,
    _key: PhantomData<fn() -> K>,
}

impl<FL, FR, K> EqualJoiner<FL, FR, K> {
    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<T, B, FL, FR, K> Joiner<T, B> for EqualJoiner<FL, FR, K>
where
    T: RowType,
    B: ColumnValue,
    FL: RowFn<T, K>,
    FR: RowFn<(B,), K>,
    K: Eq + Hash + Debug + Send + Sync + 'static,
{
    fn into_parts(self) -> JoinerParts {
        let params = vec![
            ParamId::Label("equal"),
            ParamId::Closure(ClosureId::of::<FL>()),
            ParamId::Closure(ClosureId::of::<FR>()),
        ];
        let EqualJoiner { left, right, .. } = self;
        let left: KeyPart = Arc::new(move |row: &[Value]| Key::new(left.apply(row)));
        let right: KeyPart = Arc::new(move |row: &[Value]| Key::new(right.apply(row)));
        JoinerParts {
            left: vec![left],
            right: vec![right],
            filters: Vec::new(),
            params,
        }
    }
}
