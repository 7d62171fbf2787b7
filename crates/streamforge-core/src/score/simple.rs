use std::fmt;

/// A single-level score.
///
/// ```
/// use streamforge_core::{ParseableScore, Score, SimpleScore};
///
/// let total = SimpleScore::of(-5) + SimpleScore::of(2);
/// assert_eq!(total, SimpleScore::of(-3));
/// assert!(SimpleScore::of(-3) > SimpleScore::of(-5));
/// assert_eq!(SimpleScore::parse("-3").unwrap(), total);
/// assert!(!total.has_hard_component());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScore {
    score: i64,
}

impl SimpleScore {
    pub const ZERO: SimpleScore = SimpleScore { score: 0 };
    pub const ONE: SimpleScore = SimpleScore { score: 1 };

    #[inline]
    pub const fn of(score: i64) -> Self {
        SimpleScore { score }
    }

    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }
}

level_score!(SimpleScore { score: Soft });
level_score_text!(SimpleScore { score => "" });

impl fmt::Debug for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleScore({})", self.score)
    }
}

impl From<i64> for SimpleScore {
    fn from(score: i64) -> Self {
        SimpleScore::of(score)
    }
}
