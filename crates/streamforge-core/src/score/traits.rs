//! The `Score` trait and score parsing.

use std::fmt::{self, Debug, Display};
use std::ops::{Add, Neg, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::ScoreLevel;
use crate::constraint::MatchWeight;

/// A score as the constraint engine sees it.
///
/// The engine only needs a commutative group: impacts are added when a
/// match appears, subtracted when it disappears, and a constraint weight is
/// scaled by the match weight its weigher produced. Levels are ordered
/// highest priority first and compared lexicographically.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + Eq
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Kind of each level, highest priority first.
    const LEVELS: &'static [ScoreLevel];

    fn zero() -> Self {
        Self::default()
    }

    /// The raw level values, in the order of [`LEVELS`](Self::LEVELS).
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Builds a score from raw level values; missing levels are zero.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// True when no hard level is negative.
    fn is_feasible(&self) -> bool {
        self.to_level_numbers()
            .iter()
            .zip(Self::LEVELS)
            .all(|(value, level)| *level == ScoreLevel::Soft || *value >= 0)
    }

    /// True when any hard level is non-zero.
    fn has_hard_component(&self) -> bool {
        self.to_level_numbers()
            .iter()
            .zip(Self::LEVELS)
            .any(|(value, level)| *level == ScoreLevel::Hard && *value != 0)
    }

    /// Multiplies every level, saturating at the `i64` bounds.
    fn multiply_long(&self, multiplicand: i64) -> Self {
        let levels: Vec<i64> = self
            .to_level_numbers()
            .into_iter()
            .map(|level| level.saturating_mul(multiplicand))
            .collect();
        Self::from_level_numbers(&levels)
    }

    /// Multiplies every level, rounding half away from zero.
    fn multiply_decimal(&self, multiplicand: Decimal) -> Self {
        let levels: Vec<i64> = self
            .to_level_numbers()
            .into_iter()
            .map(|level| scale_level(level, multiplicand))
            .collect();
        Self::from_level_numbers(&levels)
    }

    /// Scales a constraint weight by a match weight.
    fn multiply_weight(&self, weight: &MatchWeight) -> Self {
        match weight {
            MatchWeight::Int(1) => *self,
            MatchWeight::Int(n) => self.multiply_long(*n),
            MatchWeight::Decimal(d) => self.multiply_decimal(*d),
        }
    }
}

fn scale_level(level: i64, multiplicand: Decimal) -> i64 {
    Decimal::from(level)
        .checked_mul(multiplicand)
        .and_then(|product| {
            product
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .unwrap_or(if (level < 0) == multiplicand.is_sign_negative() {
            i64::MAX
        } else {
            i64::MIN
        })
}

/// A score with a text form, used for configured constraint weights.
///
/// `SimpleScore` reads `"-3"`, `HardSoftScore` reads `"-1hard/-20soft"`
/// and `HardSoftDecimalScore` also accepts decimals such as `"0hard/-2.5soft"`.
pub trait ParseableScore: Score {
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

impl ScoreParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ScoreParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score parse error: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}
