use std::fmt;

/// Hard and soft levels; hard always dominates.
///
/// ```
/// use streamforge_core::HardSoftScore;
///
/// let infeasible = HardSoftScore::of(-1, -100);
/// let feasible = HardSoftScore::of(0, -200);
/// assert!(feasible > infeasible);
/// assert_eq!(infeasible.to_string(), "-1hard/-100soft");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftScore {
    hard: i64,
    soft: i64,
}

impl HardSoftScore {
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };
    pub const ONE_HARD: HardSoftScore = HardSoftScore { hard: 1, soft: 0 };
    pub const ONE_SOFT: HardSoftScore = HardSoftScore { hard: 0, soft: 1 };

    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftScore { hard, soft }
    }

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore { hard, soft: 0 }
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore { hard: 0, soft }
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

level_score!(HardSoftScore { hard: Hard, soft: Soft });
level_score_text!(HardSoftScore { hard => "hard", soft => "soft" });

impl fmt::Debug for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftScore({}, {})", self.hard, self.soft)
    }
}
