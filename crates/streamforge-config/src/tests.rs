//! Tests for engine configuration.

use streamforge_core::{HardSoftScore, SimpleScore};

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "reproducible"
        constraint_match_tracking = true

        [constraint_weights]
        "Room capacity" = "-2"
    "#;

    let config = EngineConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    assert!(config.constraint_match_tracking);
    let weights = config.parse_constraint_weights::<SimpleScore>().unwrap();
    assert_eq!(weights["Room capacity"], SimpleScore::of(-2));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        environment_mode: full_assert
        constraint_weights:
          scheduling/Room capacity: 1hard/0soft
    "#;

    let config = EngineConfig::from_yaml_str(yaml).unwrap();
    assert!(config.environment_mode.is_asserted());
    assert!(!config.constraint_match_tracking);
    let weights = config.parse_constraint_weights::<HardSoftScore>().unwrap();
    assert_eq!(weights["scheduling/Room capacity"], HardSoftScore::of_hard(1));
}

#[test]
fn test_defaults() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.environment_mode, EnvironmentMode::NonReproducible);
    assert!(config.constraint_weights.is_empty());
}

#[test]
fn test_invalid_weight() {
    let config = EngineConfig::new().with_constraint_weight("Room capacity", "heavy");
    let err = config
        .parse_constraint_weights::<HardSoftScore>()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(message) if message.contains("Room capacity")));
}

#[test]
fn test_unknown_mode_is_rejected() {
    let result = EngineConfig::from_toml_str(r#"environment_mode = "paranoid""#);
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_builder() {
    let config = EngineConfig::new()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_constraint_match_tracking(true)
        .with_constraint_weight("a", "1");

    assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
    assert!(config.constraint_match_tracking);
    assert_eq!(config.constraint_weights.len(), 1);
}

#[test]
fn test_load_picks_format_from_extension() {
    let dir = std::env::temp_dir().join(format!("streamforge-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let yaml = dir.join("engine.yml");
    let toml = dir.join("engine.toml");
    std::fs::write(&yaml, "environment_mode: full_assert\n").unwrap();
    std::fs::write(&toml, "environment_mode = \"reproducible\"\n").unwrap();

    assert_eq!(
        EngineConfig::load(&yaml).unwrap().environment_mode,
        EnvironmentMode::FullAssert
    );
    assert_eq!(
        EngineConfig::load(&toml).unwrap().environment_mode,
        EnvironmentMode::Reproducible
    );
    assert!(matches!(
        EngineConfig::load(dir.join("missing.toml")),
        Err(ConfigError::Io(_))
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}
