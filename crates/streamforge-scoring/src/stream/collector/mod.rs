// Collectors for `group_by`.
//
// A collector extracts one value per input tuple and folds it into a
// per-group accumulator. Accumulators must support retracting a value that
// was previously accumulated, so a group's result stays correct as tuples
// come and go without refolding the whole group.

mod average;
mod count;
mod distinct;
mod extremes;
mod list;
mod mapped;
mod sum;


use std::marker::PhantomData;
use std::sync::Arc;

use crate::graph::ParamId;
use crate::value::{expect_value, ColumnValue, Value};

pub use average::{average, AverageAccumulator};
pub use count::{count, CountAccumulator, CountCollector};
pub use distinct::{count_distinct, to_set, CountDistinctAccumulator, ToSetAccumulator};
pub use extremes::{max, min, MaxAccumulator, MinAccumulator};
pub use list::{to_list, ToListAccumulator};
pub use mapped::MappedCollector;
pub use sum::{sum, ExactSum, SumAccumulator};

// Folds extracted values of type `V` into a group result.
//
// `retract` is only ever called with a value that was accumulated before
// and not yet retracted.
pub trait Accumulator<V>: Send + 'static {
    type Result: ColumnValue;

    fn accumulate(&mut self, value: &V);

    fn retract(&mut self, value: &V);

    fn finish(&self) -> Self::Result;

    fn reset(&mut self);
}

// A collector over tuples of shape `T`.
pub trait Collector<T>: Send + Sync + 'static {
    type Output: ColumnValue;

    #[doc(hidden)]
    fn into_part(self) -> CollectorPart;
}

#[doc(hidden)]
pub struct CollectorPart {
    pub(crate) collector: Arc<dyn DynCollector>,
    pub(crate) params: Vec<ParamId>,
}

pub(crate) trait DynCollector: Send + Sync {
    fn extract(&self, row: &[Value]) -> Value;

    fn create_accumulator(&self) -> Box<dyn DynAccumulator>;
}

pub(crate) trait DynAccumulator: Send {
    fn accumulate(&mut self, value: &Value);

    fn retract(&mut self, value: &Value);

    fn finish(&self) -> Value;

    fn reset(&mut self);
}

struct ErasedAccumulator<A, V> {
    inner: A,
    _value: PhantomData<fn(&V)>,
}

impl<A, V> ErasedAccumulator<A, V> {
    fn boxed(inner: A) -> Box<dyn DynAccumulator>
    where
        A: Accumulator<V>,
        V: 'static,
    {
        Box::new(Self {
            inner,
            _value: PhantomData,
        })
    }
}

impl<A: Accumulator<V>, V: 'static> DynAccumulator for ErasedAccumulator<A, V> {
    fn accumulate(&mut self, value: &Value) {
        self.inner.accumulate(expect_value::<V>(value));
    }

    fn retract(&mut self, value: &Value) {
        self.inner.retract(expect_value::<V>(value));
    }

    fn finish(&self) -> Value {
        Arc::new(self.inner.finish())
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
