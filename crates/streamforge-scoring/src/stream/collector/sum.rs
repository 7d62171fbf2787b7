// Sum collector.

use std::ops::{AddAssign, SubAssign};

use rust_decimal::Decimal;

use super::{Accumulator, MappedCollector};
use crate::value::ColumnValue;

// Sums the values extracted from each tuple of a group.
pub fn sum<F, V>(mapper: F) -> MappedCollector<F, V, SumAccumulator<V>> {
    MappedCollector::new(mapper, "sum")
}

// A value type whose addition is exact, so retracting a value restores the
// previous sum whatever the order of accumulation. Floats are excluded.
pub trait ExactSum: ColumnValue + Default + Copy + AddAssign + SubAssign {}

macro_rules! exact_sum {
    ($($t:ty),+) => {
        $(impl ExactSum for $t {})+
    };
}

exact_sum!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, Decimal);

#[derive(Debug)]
pub struct SumAccumulator<V> {
    sum: V,
}

impl<V: Default> Default for SumAccumulator<V> {
    fn default() -> Self {
        Self { sum: V::default() }
    }
}

impl<V: ExactSum> Accumulator<V> for SumAccumulator<V> {
    type Result = V;

    #[inline]
    fn accumulate(&mut self, value: &V) {
        self.sum += *value;
    }

    #[inline]
    fn retract(&mut self, value: &V) {
        self.sum -= *value;
    }

    #[inline]
    fn finish(&self) -> V {
        self.sum
    }

    #[inline]
    fn reset(&mut self) {
        self.sum = V::default();
    }
}
