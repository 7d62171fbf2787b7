// Count collector.

use std::sync::Arc;

use super::{Accumulator, Collector, CollectorPart, DynAccumulator, DynCollector, ErasedAccumulator};
use crate::graph::ParamId;
use crate::row::RowType;
use crate::value::Value;

// Counts the tuples of each group.
//
// # Example
//
// ```
// use streamforge_scoring::stream::collector::{Accumulator, CountAccumulator};
//
// let mut acc = CountAccumulator::default();
// acc.accumulate(&());
// acc.accumulate(&());
// acc.retract(&());
// assert_eq!(acc.finish(), 1);
// ```
pub fn count() -> CountCollector {
    CountCollector
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountCollector;

impl<T: RowType> Collector<T> for CountCollector {
    type Output = usize;

    fn into_part(self) -> CollectorPart {
        CollectorPart {
            collector: Arc::new(CountCollector),
            params: vec![ParamId::Label("count")],
        }
    }
}

impl DynCollector for CountCollector {
    fn extract(&self, _row: &[Value]) -> Value {
        Arc::new(())
    }

    fn create_accumulator(&self) -> Box<dyn DynAccumulator> {
        ErasedAccumulator::<CountAccumulator, ()>::boxed(CountAccumulator::default())
    }
}

#[derive(Debug, Default)]
pub struct CountAccumulator {
    count: usize,
}

impl Accumulator<()> for CountAccumulator {
    type Result = usize;

    #[inline]
    fn accumulate(&mut self, _: &()) {
        self.count += 1;
    }

    #[inline]
    fn retract(&mut self, _: &()) {
        self.count = self.count.saturating_sub(1);
    }

    #[inline]
    fn finish(&self) -> usize {
        self.count
    }

    #[inline]
    fn reset(&mut self) {
        self.count = 0;
    }
}
