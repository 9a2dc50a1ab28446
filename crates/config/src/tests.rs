use std::io::Write;

use tempfile::NamedTempFile;

use crate::*;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_config_is_valid() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.matching.ride_batch_size, 100);
    assert_eq!(config.matching.candidate_cap, 30);
    assert_eq!(config.matching.terminal_status_count, 6);
    assert_eq!(config.matching.exhaustion_policy, ExhaustionPolicy::StopPass);
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let file = write_config(
        r#"
[database]
url = "sqlite::memory:"
max_connections = 2
min_connections = 1
connection_timeout_seconds = 5
idle_timeout_seconds = 60
run_migrations = true

[matching]
enabled = true
poll_interval_ms = 250
ride_batch_size = 20
candidate_cap = 5
exhaustion_policy = "continue"
terminal_status_count = 6
"#,
    );

    let config = AppConfig::load(file.path().to_str()).unwrap();
    assert_eq!(config.database.url, "sqlite::memory:");
    assert_eq!(config.matching.poll_interval_ms, 250);
    assert_eq!(config.matching.ride_batch_size, 20);
    assert_eq!(config.matching.candidate_cap, 5);
    assert_eq!(config.matching.exhaustion_policy, ExhaustionPolicy::Continue);
    // section missing from the file falls back to defaults
    assert_eq!(config.observability.log_format, "pretty");
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let result = AppConfig::load(Some("/definitely/not/here/matcher.toml"));
    assert!(result.is_err());
}

#[test]
fn test_invalid_matching_values_rejected() {
    let file = write_config(
        r#"
[matching]
candidate_cap = 0
"#,
    );
    assert!(AppConfig::load(file.path().to_str()).is_err());

    let mut config = AppConfig::default();
    config.matching.ride_batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.matching.poll_interval_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_database_url_must_be_sqlite() {
    let mut config = AppConfig::default();
    config.database.url = "postgres://localhost/rides".to_string();
    assert!(config.validate().is_err());

    config.database.url = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_observability_validation() {
    let mut config = AppConfig::default();
    config.observability.log_format = "xml".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.observability.metrics_enabled = true;
    config.observability.metrics_listen_address = "not-an-address".to_string();
    assert!(config.validate().is_err());

    config.observability.metrics_listen_address = "0.0.0.0:9100".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_round_trip_keeps_policy() {
    let mut config = AppConfig::default();
    config.matching.exhaustion_policy = ExhaustionPolicy::Continue;

    let rendered = config.to_toml().unwrap();
    assert!(rendered.contains("exhaustion_policy = \"continue\""));

    let parsed = AppConfig::from_toml(&rendered).unwrap();
    assert_eq!(parsed.matching.exhaustion_policy, ExhaustionPolicy::Continue);
}
