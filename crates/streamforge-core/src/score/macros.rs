//! Impls shared by the level-based score types.

/// Lexicographic ordering, field-wise arithmetic and `Score` for a struct
/// of `i64` levels listed highest priority first.
macro_rules! level_score {
    ($type:ident { $($field:ident: $level:ident),+ }) => {
        impl $crate::score::traits::Score for $type {
            const LEVELS: &'static [$crate::score::ScoreLevel] =
                &[$($crate::score::ScoreLevel::$level),+];

            fn to_level_numbers(&self) -> Vec<i64> {
                vec![$(self.$field),+]
            }

            fn from_level_numbers(levels: &[i64]) -> Self {
                let mut levels = levels.iter().copied();
                $type {
                    $($field: levels.next().unwrap_or(0)),+
                }
            }

            fn multiply_long(&self, multiplicand: i64) -> Self {
                $type {
                    $($field: self.$field.saturating_mul(multiplicand)),+
                }
            }
        }

        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                $(
                    match self.$field.cmp(&other.$field) {
                        std::cmp::Ordering::Equal => {}
                        unequal => return unequal,
                    }
                )+
                std::cmp::Ordering::Equal
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type { $($field: self.$field + other.$field),+ }
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type { $($field: self.$field - other.$field),+ }
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type { $($field: -self.$field),+ }
            }
        }
    };
}

/// `Display` and `ParseableScore` for integer levels written as
/// `"<value><suffix>"` joined by `/`.
macro_rules! level_score_text {
    ($type:ident { $($field:ident => $suffix:literal),+ }) => {
        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let parts: Vec<String> = vec![$(format!("{}{}", self.$field, $suffix)),+];
                f.write_str(&parts.join("/"))
            }
        }

        impl $crate::score::traits::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::traits::ScoreParseError> {
                use $crate::score::traits::ScoreParseError;

                let text = s.trim();
                let mut parts = text.split('/').map(str::trim);
                $(
                    let $field = {
                        let part = parts.next().ok_or_else(|| {
                            ScoreParseError::new(format!(
                                "{} '{}' has no '{}' level",
                                stringify!($type), text, $suffix
                            ))
                        })?;
                        let number = part.strip_suffix($suffix).ok_or_else(|| {
                            ScoreParseError::new(format!(
                                "level '{}' of {} '{}' must end with '{}'",
                                part, stringify!($type), text, $suffix
                            ))
                        })?;
                        number.parse::<i64>().map_err(|e| {
                            ScoreParseError::new(format!(
                                "invalid {} level '{}': {}",
                                stringify!($field), number, e
                            ))
                        })?
                    };
                )+
                if parts.next().is_some() {
                    return Err(ScoreParseError::new(format!(
                        "{} '{}' has too many levels",
                        stringify!($type), text
                    )));
                }
                Ok($type { $($field),+ })
            }
        }
    };
}
