// Collector built from a mapping closure and an accumulator type.

use std::marker::PhantomData;
use std::sync::Arc;

use super::{Accumulator, Collector, CollectorPart, DynAccumulator, DynCollector, ErasedAccumulator};
use crate::graph::{ClosureId, ParamId};
use crate::row::{RowFn, RowType};
use crate::value::{ColumnValue, Value};

// Maps each tuple to a `V` and folds it with accumulator `A`.
//
// Created by [`sum()`](super::sum), [`min()`](super::min) and the other
// mapped collector functions.
pub struct MappedCollector<F, V, A> {
    mapper: F,
    label: &'static str,
    _phantom: PhantomData<fn(&V) -> A>,
}

impl<F, V, A> MappedCollector<F, V, A> {
    pub(crate) fn new(mapper: F, label: &'static str) -> Self {
        Self {
            mapper,
            label,
            _phantom: PhantomData,
        }
    }
}

impl<T, F, V, A> Collector<T> for MappedCollector<F, V, A>
where
    T: RowType,
    F: RowFn<T, V>,
    V: ColumnValue,
    A: Accumulator<V> + Default,
{
    type Output = A::Result;

    fn into_part(self) -> CollectorPart {
        let params = vec![
            ParamId::Label(self.label),
            ParamId::Closure(ClosureId::of::<F>()),
        ];
        CollectorPart {
            collector: Arc::new(ErasedMapped::<T, F, V, A> {
                mapper: self.mapper,
                _phantom: PhantomData,
            }),
            params,
        }
    }
}

struct ErasedMapped<T, F, V, A> {
    mapper: F,
    _phantom: PhantomData<fn(&T, &V) -> A>,
}

impl<T, F, V, A> DynCollector for ErasedMapped<T, F, V, A>
where
    T: RowType,
    F: RowFn<T, V>,
    V: ColumnValue,
    A: Accumulator<V> + Default,
{
    fn extract(&self, row: &[Value]) -> Value {
        Arc::new(self.mapper.apply(row))
    }

    fn create_accumulator(&self) -> Box<dyn DynAccumulator> {
        ErasedAccumulator::<A, V>::boxed(A::default())
    }
}
