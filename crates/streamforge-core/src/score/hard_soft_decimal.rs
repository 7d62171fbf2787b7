use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::traits::{ParseableScore, ScoreParseError};

const SCALE: i64 = 100_000;
const SCALE_DIGITS: u32 = 5;

/// Hard and soft levels with five decimal places, stored as scaled `i64`s.
///
/// Decimal match weights scale it exactly up to the fifth place.
///
/// ```
/// use rust_decimal::Decimal;
/// use streamforge_core::{HardSoftDecimalScore, Score};
///
/// let weight = HardSoftDecimalScore::of_soft(1);
/// let impact = weight.multiply_decimal(Decimal::new(25, 1));
/// assert_eq!(impact.to_string(), "0hard/2.5soft");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftDecimalScore {
    hard: i64,
    soft: i64,
}

impl HardSoftDecimalScore {
    pub const ZERO: HardSoftDecimalScore = HardSoftDecimalScore { hard: 0, soft: 0 };
    pub const ONE_HARD: HardSoftDecimalScore = HardSoftDecimalScore {
        hard: SCALE,
        soft: 0,
    };
    pub const ONE_SOFT: HardSoftDecimalScore = HardSoftDecimalScore {
        hard: 0,
        soft: SCALE,
    };

    /// Whole (unscaled) levels.
    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore {
            hard: hard * SCALE,
            soft: soft * SCALE,
        }
    }

    /// Levels already multiplied by 100000.
    #[inline]
    pub const fn of_scaled(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore { hard, soft }
    }

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        Self::of(hard, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        Self::of(0, soft)
    }

    /// Rounds past the fifth decimal place; `None` when out of range.
    pub fn of_decimal(hard: Decimal, soft: Decimal) -> Option<Self> {
        Some(Self::of_scaled(to_scaled(hard)?, to_scaled(soft)?))
    }

    #[inline]
    pub const fn hard_scaled(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn soft_scaled(&self) -> i64 {
        self.soft
    }

    pub fn hard(&self) -> Decimal {
        Decimal::new(self.hard, SCALE_DIGITS).normalize()
    }

    pub fn soft(&self) -> Decimal {
        Decimal::new(self.soft, SCALE_DIGITS).normalize()
    }
}

fn to_scaled(value: Decimal) -> Option<i64> {
    value
        .checked_mul(Decimal::from(SCALE))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

level_score!(HardSoftDecimalScore { hard: Hard, soft: Soft });

impl fmt::Debug for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftDecimalScore({}, {})", self.hard(), self.soft())
    }
}

impl fmt::Display for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard(), self.soft())
    }
}

impl ParseableScore for HardSoftDecimalScore {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let text = s.trim();
        let (hard, soft) = text.split_once('/').ok_or_else(|| {
            ScoreParseError::new(format!(
                "HardSoftDecimalScore '{}' must look like 'Xhard/Ysoft'",
                text
            ))
        })?;
        Ok(HardSoftDecimalScore::of_scaled(
            parse_level(hard, "hard")?,
            parse_level(soft, "soft")?,
        ))
    }
}

fn parse_level(part: &str, suffix: &str) -> Result<i64, ScoreParseError> {
    let number = part.trim().strip_suffix(suffix).ok_or_else(|| {
        ScoreParseError::new(format!("level '{}' must end with '{}'", part, suffix))
    })?;
    let value = number.parse::<Decimal>().map_err(|e| {
        ScoreParseError::new(format!("invalid {} level '{}': {}", suffix, number, e))
    })?;
    to_scaled(value).ok_or_else(|| {
        ScoreParseError::new(format!("{} level '{}' is out of range", suffix, number))
    })
}
