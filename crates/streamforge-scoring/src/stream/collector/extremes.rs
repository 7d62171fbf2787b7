// Minimum and maximum collectors.
//
// Values are kept in a multiset so the extreme survives retraction of
// duplicates.

use std::collections::BTreeMap;

use super::{Accumulator, MappedCollector};
use crate::value::ColumnValue;

// Smallest extracted value of each group.
pub fn min<F, V>(mapper: F) -> MappedCollector<F, V, MinAccumulator<V>> {
    MappedCollector::new(mapper, "min")
}

// Largest extracted value of each group.
pub fn max<F, V>(mapper: F) -> MappedCollector<F, V, MaxAccumulator<V>> {
    MappedCollector::new(mapper, "max")
}

#[derive(Debug)]
struct Multiset<V> {
    counts: BTreeMap<V, usize>,
}

impl<V: Ord + Clone> Multiset<V> {
    fn insert(&mut self, value: &V) {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
    }

    fn remove(&mut self, value: &V) {
        if let Some(count) = self.counts.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(value);
            }
        }
    }
}

impl<V> Default for Multiset<V> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct MinAccumulator<V> {
    values: Multiset<V>,
}

impl<V> Default for MinAccumulator<V> {
    fn default() -> Self {
        Self {
            values: Multiset::default(),
        }
    }
}

impl<V: ColumnValue + Ord + Clone> Accumulator<V> for MinAccumulator<V> {
    type Result = Option<V>;

    fn accumulate(&mut self, value: &V) {
        self.values.insert(value);
    }

    fn retract(&mut self, value: &V) {
        self.values.remove(value);
    }

    fn finish(&self) -> Option<V> {
        self.values.counts.keys().next().cloned()
    }

    fn reset(&mut self) {
        self.values.counts.clear();
    }
}

#[derive(Debug)]
pub struct MaxAccumulator<V> {
    values: Multiset<V>,
}

impl<V> Default for MaxAccumulator<V> {
    fn default() -> Self {
        Self {
            values: Multiset::default(),
        }
    }
}

impl<V: ColumnValue + Ord + Clone> Accumulator<V> for MaxAccumulator<V> {
    type Result = Option<V>;

    fn accumulate(&mut self, value: &V) {
        self.values.insert(value);
    }

    fn retract(&mut self, value: &V) {
        self.values.remove(value);
    }

    fn finish(&self) -> Option<V> {
        self.values.counts.keys().next_back().cloned()
    }

    fn reset(&mut self) {
        self.values.counts.clear();
    }
}
