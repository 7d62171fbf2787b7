//! Constraint identity and the sign and size of a match's impact.

use std::fmt;

use rust_decimal::Decimal;

/// Identifies a constraint by package and name.
///
/// The full name is `package/name`, or the bare name when the package is
/// empty. Weight overrides and score explanations accept either form.
///
/// ```
/// use streamforge_core::ConstraintRef;
///
/// assert_eq!(ConstraintRef::new("rooms", "Capacity").full_name(), "rooms/Capacity");
/// assert_eq!(ConstraintRef::new("", "Capacity").full_name(), "Capacity");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    pub package: String,
    pub name: String,
}

impl ConstraintRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        match self.package.as_str() {
            "" => self.name.clone(),
            package => format!("{}/{}", package, self.name),
        }
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}/", self.package)?;
        }
        f.write_str(&self.name)
    }
}

/// Whether matches of a constraint lower or raise the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    Penalty,
    Reward,
}

impl ImpactType {
    /// Factor applied to the weighted impact: `-1` or `1`.
    pub fn sign(self) -> i64 {
        match self {
            ImpactType::Penalty => -1,
            ImpactType::Reward => 1,
        }
    }
}

/// Weight of a single constraint match, as returned by a match weigher.
///
/// Integer weighers produce [`MatchWeight::Int`]; arbitrary precision
/// weighers produce [`MatchWeight::Decimal`].
///
/// ```
/// use rust_decimal::Decimal;
/// use streamforge_core::MatchWeight;
///
/// assert_eq!(MatchWeight::from(3), MatchWeight::Int(3));
/// assert_eq!(MatchWeight::from(7_i64), MatchWeight::Int(7));
/// assert!(MatchWeight::from(Decimal::ZERO).is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchWeight {
    Int(i64),
    Decimal(Decimal),
}

impl MatchWeight {
    /// The weight of an unweighted match.
    pub const ONE: MatchWeight = MatchWeight::Int(1);

    pub fn is_zero(&self) -> bool {
        match self {
            MatchWeight::Int(n) => *n == 0,
            MatchWeight::Decimal(d) => d.is_zero(),
        }
    }
}

impl Default for MatchWeight {
    fn default() -> Self {
        MatchWeight::ONE
    }
}

macro_rules! int_match_weight {
    ($($int:ty),+) => {
        $(
            impl From<$int> for MatchWeight {
                fn from(weight: $int) -> Self {
                    MatchWeight::Int(i64::try_from(weight).unwrap_or(i64::MAX))
                }
            }
        )+
    };
}

int_match_weight!(i32, i64, u32, usize);

impl From<Decimal> for MatchWeight {
    fn from(weight: Decimal) -> Self {
        MatchWeight::Decimal(weight)
    }
}

impl fmt::Display for MatchWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchWeight::Int(n) => write!(f, "{}", n),
            MatchWeight::Decimal(d) => write!(f, "{}", d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_full_name() {
        for cr in [
            ConstraintRef::new("timetable.rooms", "Capacity"),
            ConstraintRef::new("", "Capacity"),
        ] {
            assert_eq!(cr.to_string(), cr.full_name());
        }
    }

    #[test]
    fn test_refs_order_by_package_first() {
        let mut refs = vec![ConstraintRef::new("b", "A"), ConstraintRef::new("a", "Z")];
        refs.sort();
        assert_eq!(refs[0].package, "a");
    }

    #[test]
    fn test_impact_sign() {
        assert_eq!(ImpactType::Penalty.sign(), -1);
        assert_eq!(ImpactType::Reward.sign(), 1);
    }

    #[test]
    fn test_match_weight_conversions() {
        assert_eq!(MatchWeight::from(2_u32), MatchWeight::Int(2));
        assert_eq!(MatchWeight::from(4_usize), MatchWeight::Int(4));
        assert_eq!(MatchWeight::default(), MatchWeight::ONE);
        assert!(MatchWeight::Int(0).is_zero());
        assert!(!MatchWeight::Decimal(Decimal::new(15, 1)).is_zero());
    }
}
