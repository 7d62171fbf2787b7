// Distinct-value collectors.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::{Accumulator, MappedCollector};
use crate::value::ColumnValue;

// Number of distinct extracted values in each group.
pub fn count_distinct<F, V>(mapper: F) -> MappedCollector<F, V, CountDistinctAccumulator<V>> {
    MappedCollector::new(mapper, "count_distinct")
}

// Set of distinct extracted values in each group.
pub fn to_set<F, V>(mapper: F) -> MappedCollector<F, V, ToSetAccumulator<V>> {
    MappedCollector::new(mapper, "to_set")
}

#[derive(Debug)]
struct Counts<V> {
    counts: HashMap<V, usize>,
}

impl<V> Default for Counts<V> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<V: Eq + Hash + Clone> Counts<V> {
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

#[derive(Debug)]
pub struct CountDistinctAccumulator<V> {
    values: Counts<V>,
}

impl<V> Default for CountDistinctAccumulator<V> {
    fn default() -> Self {
        Self {
            values: Counts::default(),
        }
    }
}

impl<V: ColumnValue + Eq + Hash + Clone> Accumulator<V> for CountDistinctAccumulator<V> {
    type Result = usize;

    fn accumulate(&mut self, value: &V) {
        self.values.insert(value);
    }

    fn retract(&mut self, value: &V) {
        self.values.remove(value);
    }

    fn finish(&self) -> usize {
        self.values.counts.len()
    }

    fn reset(&mut self) {
        self.values.counts.clear();
    }
}

#[derive(Debug)]
pub struct ToSetAccumulator<V> {
    values: Counts<V>,
}

impl<V> Default for ToSetAccumulator<V> {
    fn default() -> Self {
        Self {
            values: Counts::default(),
        }
    }
}

impl<V: ColumnValue + Eq + Hash + Clone> Accumulator<V> for ToSetAccumulator<V> {
    type Result = HashSet<V>;

    fn accumulate(&mut self, value: &V) {
        self.values.insert(value);
    }

    fn retract(&mut self, value: &V) {
        self.values.remove(value);
    }

    fn finish(&self) -> HashSet<V> {
        self.values.counts.keys().cloned().collect()
    }

    fn reset(&mut self) {
        self.values.counts.clear();
    }
}
