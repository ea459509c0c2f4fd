//! Tests for matching configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        [executor]
        thread_name = "matcher"
        shutdown_timeout_ms = 1500

        [solver]
        unassigned_sentinel = 2147483647

        [logging]
        filter = "matchforge_engine=debug"
    "#;

    let config = MatchingConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.executor.thread_name, "matcher");
    assert_eq!(config.executor.shutdown_timeout_ms, 1500);
    assert_eq!(config.solver.unassigned_sentinel, 2_147_483_647);
    assert_eq!(config.logging.filter, "matchforge_engine=debug");
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        executor:
          thread_name: matcher
        solver:
          unassigned_sentinel: -3
    "#;

    let config = MatchingConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.executor.thread_name, "matcher");
    assert_eq!(config.executor.shutdown_timeout_ms, 5_000);
    assert_eq!(config.solver.unassigned_sentinel, -3);
}

#[test]
fn test_defaults() {
    let config = MatchingConfig::from_toml_str("").unwrap();
    assert_eq!(config, MatchingConfig::default());
    assert_eq!(config.executor.thread_name, "matchforge-worker");
    assert_eq!(config.solver.unassigned_sentinel, -1);
    assert_eq!(config.logging.filter, "matchforge=info");
}

#[test]
fn test_builder() {
    let config = MatchingConfig::new()
        .with_thread_name("ui-worker")
        .with_shutdown_timeout_ms(10)
        .with_unassigned_sentinel(-9)
        .with_log_filter("warn");

    assert_eq!(config.executor.thread_name, "ui-worker");
    assert_eq!(config.executor.shutdown_timeout(), Duration::from_millis(10));
    assert_eq!(config.solver.unassigned_sentinel, -9);
    assert_eq!(config.logging.filter, "warn");
}

#[test]
fn test_empty_thread_name_is_invalid() {
    let result = MatchingConfig::from_toml_str(
        r#"
        [executor]
        thread_name = "  "
    "#,
    );
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_thread_name_with_nul_is_invalid() {
    let result = MatchingConfig::from_toml_str(
        r#"
        [executor]
        thread_name = "worker\u0000one"
    "#,
    );
    assert!(matches!(result, Err(ConfigError::Invalid(_))));

    let config = MatchingConfig::new().with_thread_name("worker\0two");
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_missing_file() {
    let result = MatchingConfig::load("/nonexistent/matchforge.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_toml() {
    let result = MatchingConfig::from_toml_str("[executor\nthread_name = 1");
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}
