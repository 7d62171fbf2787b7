//! Engine settings read from a TOML or YAML file.
//!
//! A session factory takes its assertion mode, its default for match
//! tracking and its constraint weight overrides from an [`EngineConfig`].
//!
//! # Examples
//!
//! ```
//! use streamforge_config::{EngineConfig, EnvironmentMode};
//! use streamforge_core::HardSoftScore;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!     constraint_match_tracking = true
//!
//!     [constraint_weights]
//!     "Room capacity" = "1hard/0soft"
//!     "Preferred room" = "0hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! let weights = config.parse_constraint_weights::<HardSoftScore>().unwrap();
//! assert_eq!(weights["Room capacity"], HardSoftScore::of_hard(1));
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use streamforge_config::EngineConfig;
//!
//! let config = EngineConfig::load("engine.toml").unwrap_or_default();
//! assert!(!config.constraint_match_tracking);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use streamforge_core::ParseableScore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read engine config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed TOML engine config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("malformed YAML engine config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid engine config: {0}")]
    Invalid(String),
}

/// Settings consumed by `SessionFactoryBuilder::with_config`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Environment mode affecting runtime assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Default for sessions built without an explicit tracking choice.
    #[serde(default)]
    pub constraint_match_tracking: bool,

    /// Constraint weight overrides, keyed by constraint name or full name,
    /// in the score type's textual format.
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path` as YAML when it ends in `.yaml` or `.yml`, as TOML
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_constraint_match_tracking(mut self, enabled: bool) -> Self {
        self.constraint_match_tracking = enabled;
        self
    }

    pub fn with_constraint_weight(
        mut self,
        constraint: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        self.constraint_weights
            .insert(constraint.into(), weight.into());
        self
    }

    /// Parses every configured constraint weight as a score.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first weight that does
    /// not parse.
    pub fn parse_constraint_weights<Sc: ParseableScore>(
        &self,
    ) -> Result<HashMap<String, Sc>, ConfigError> {
        self.constraint_weights
            .iter()
            .map(|(name, text)| {
                Sc::parse(text)
                    .map(|weight| (name.clone(), weight))
                    .map_err(|e| {
                        ConfigError::Invalid(format!("weight of constraint '{}': {}", name, e))
                    })
            })
            .collect()
    }
}

/// How much a session checks its own incremental results.
///
/// Propagation never depends on hash order: sessions fed the same sequence
/// of operations allocate the same tuples and report matches in the same
/// order, whatever the mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// No extra checks.
    #[default]
    NonReproducible,

    /// No extra checks. Accepted for configurations that ask for
    /// reproducible runs, which every mode provides.
    Reproducible,

    /// Every score calculation is verified against a session rebuilt from
    /// the current facts.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_asserted(self) -> bool {
        matches!(self, EnvironmentMode::FullAssert)
    }
}

#[cfg(test)]
mod tests;
