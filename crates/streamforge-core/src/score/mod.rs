//! Score types.
//!
//! The engine never interprets a score beyond its levels: it adds,
//! subtracts and negates impacts and scales weights by match weights.

#[macro_use]
mod macros;

mod hard_soft;
mod hard_soft_decimal;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use hard_soft::HardSoftScore;
pub use hard_soft_decimal::HardSoftDecimalScore;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreParseError};

/// Priority class of one score level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Must not be broken in a feasible solution.
    Hard,
    Soft,
}
