// Average collector.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use super::{Accumulator, MappedCollector};
use crate::value::ColumnValue;

// Arithmetic mean of the extracted values, `None` for an empty group.
//
// The running sum is a `Decimal`, so a retraction undoes its accumulation
// exactly; only the final quotient is rounded to `f64`.
pub fn average<F, V>(mapper: F) -> MappedCollector<F, V, AverageAccumulator<V>> {
    MappedCollector::new(mapper, "average")
}

#[derive(Debug)]
pub struct AverageAccumulator<V> {
    sum: Decimal,
    count: usize,
    _value: std::marker::PhantomData<fn(&V)>,
}

impl<V> Default for AverageAccumulator<V> {
    fn default() -> Self {
        Self {
            sum: Decimal::ZERO,
            count: 0,
            _value: std::marker::PhantomData,
        }
    }
}

impl<V: ColumnValue + Copy + Into<Decimal>> Accumulator<V> for AverageAccumulator<V> {
    type Result = Option<f64>;

    fn accumulate(&mut self, value: &V) {
        self.sum += (*value).into();
        self.count += 1;
    }

    fn retract(&mut self, value: &V) {
        self.sum -= (*value).into();
        self.count = self.count.saturating_sub(1);
    }

    fn finish(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        (self.sum / Decimal::from(self.count)).to_f64()
    }

    fn reset(&mut self) {
        self.sum = Decimal::ZERO;
        self.count = 0;
    }
}
