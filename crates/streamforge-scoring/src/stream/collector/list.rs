// List collector.

use super::{Accumulator, MappedCollector};
use crate::value::ColumnValue;

// Extracted values of each group, duplicates kept, in ascending order.
//
// The order depends only on the values, never on the order tuples were
// folded in, so a list built incrementally equals one built from scratch.
pub fn to_list<F, V>(mapper: F) -> MappedCollector<F, V, ToListAccumulator<V>> {
    MappedCollector::new(mapper, "to_list")
}

#[derive(Debug)]
pub struct ToListAccumulator<V> {
    sorted: Vec<V>,
}

impl<V> Default for ToListAccumulator<V> {
    fn default() -> Self {
        Self { sorted: Vec::new() }
    }
}

impl<V: ColumnValue + Ord + Clone> Accumulator<V> for ToListAccumulator<V> {
    type Result = Vec<V>;

    fn accumulate(&mut self, value: &V) {
        let at = self.sorted.partition_point(|item| item <= value);
        self.sorted.insert(at, value.clone());
    }

    fn retract(&mut self, value: &V) {
        if let Ok(at) = self.sorted.binary_search(value) {
            self.sorted.remove(at);
        }
    }

    fn finish(&self) -> Vec<V> {
        self.sorted.clone()
    }

    fn reset(&mut self) {
        self.sorted.clear();
    }
}
