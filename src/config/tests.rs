//! Tests for config functionality.

use crate::config::Config;
use crate::error::LockError;
use crate::fs::OpenMode;
use crate::locks::{DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT, LockFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.timeout, Some(5.0));
    assert_eq!(config.check_interval, 0.25);
    assert!(!config.fail_when_locked);
    assert_eq!(config.mode, "a");
    assert!(!config.shared);
    assert!(!config.blocking);
    assert!(config.semaphore_directory.is_none());
    assert_eq!(config.filename_pattern, "{name}.{number:02d}.lock");
    config.validate().unwrap();
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
timeout: 1.5
shared: true
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.timeout, Some(1.5));
    assert!(config.shared);

    // Unspecified values should use defaults
    assert_eq!(config.check_interval, 0.25);
    assert_eq!(config.mode, "a");
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
timeout: 10
check_interval: 0.05
fail_when_locked: true
mode: "w+"
shared: false
blocking: true
semaphore_directory: /var/lock/jobs
filename_pattern: "{name}-{number:03d}.pid"
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.timeout, Some(10.0));
    assert_eq!(config.check_interval, 0.05);
    assert!(config.fail_when_locked);
    assert_eq!(config.mode, "w+");
    assert!(config.blocking);
    assert_eq!(
        config.semaphore_directory.as_deref(),
        Some(Path::new("/var/lock/jobs"))
    );
    assert_eq!(config.filename_pattern, "{name}-{number:03d}.pid");
}

#[test]
fn test_null_timeout_means_single_attempt() {
    let config = Config::from_yaml("timeout: null").unwrap();
    assert_eq!(config.timeout, None);
    assert_eq!(config.timeout_duration().unwrap(), None);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
timeout: 2
future_option: something
nested:
  key: value
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.timeout, Some(2.0));
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let err = Config::from_yaml("timeout: [not, a, number]").unwrap_err();
    assert!(matches!(err, LockError::Config(_)));
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_negative_timeout_rejected() {
    let err = Config::from_yaml("timeout: -1").unwrap_err();
    assert!(matches!(err, LockError::Config(_)));
    assert!(err.to_string().contains("timeout"));
}

#[test]
fn test_negative_check_interval_rejected() {
    let err = Config::from_yaml("check_interval: -0.5").unwrap_err();
    assert!(err.to_string().contains("check_interval"));
}

#[test]
fn test_invalid_mode_rejected() {
    let err = Config::from_yaml("mode: q").unwrap_err();
    assert!(matches!(err, LockError::Config(_)));
}

#[test]
fn test_pattern_without_number_rejected() {
    let err = Config::from_yaml("filename_pattern: \"{name}.lock\"").unwrap_err();
    assert!(err.to_string().contains("{number}"));
}

#[test]
fn test_yaml_roundtrip_keeps_values() {
    let config = Config {
        timeout: None,
        shared: true,
        semaphore_directory: Some(PathBuf::from("/tmp/sem")),
        ..Config::default()
    };

    let yaml = config.to_yaml().unwrap();
    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_load_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("filegate.yaml");
    std::fs::write(&path, "fail_when_locked: true\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert!(config.fail_when_locked);
}

#[test]
fn test_load_missing_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(temp.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, LockError::Config(_)));
    assert!(err.to_string().contains("missing.yaml"));
}

#[test]
fn test_lock_options_from_defaults() {
    let options = Config::default().lock_options("a.lock").unwrap();

    assert_eq!(options.lock_path(), Path::new("a.lock"));
    assert_eq!(options.timeout, Some(DEFAULT_TIMEOUT));
    assert_eq!(options.check_interval, DEFAULT_CHECK_INTERVAL);
    assert_eq!(options.mode, OpenMode::APPEND);
    assert_eq!(options.flags, LockFlags::default());
}

#[test]
fn test_lock_options_flags() {
    let config = Config {
        shared: true,
        blocking: true,
        mode: "w".to_string(),
        ..Config::default()
    };
    let options = config.lock_options("a.lock").unwrap();

    assert_eq!(options.flags, LockFlags::SHARED);
    assert_eq!(options.mode, OpenMode::WRITE);
    assert!(options.validate().is_ok());
}

#[test]
fn test_semaphore_from_config() {
    let temp = TempDir::new().unwrap();
    let config = Config {
        timeout: Some(0.0),
        semaphore_directory: Some(temp.path().to_path_buf()),
        filename_pattern: "{name}_{number}.lock".to_string(),
        ..Config::default()
    };

    let mut semaphore = config.semaphore("jobs", 2).unwrap();
    assert_eq!(semaphore.lock_directory(), temp.path());
    assert_eq!(semaphore.filename(1), temp.path().join("jobs_1.lock"));

    semaphore.acquire().unwrap();
    semaphore.release().unwrap();
}

#[test]
fn test_semaphore_zero_maximum_from_config() {
    let err = Config::default().semaphore("jobs", 0).unwrap_err();
    assert!(matches!(err, LockError::Config(_)));
}

#[test]
fn test_fractional_durations() {
    let config = Config {
        timeout: Some(0.5),
        check_interval: 0.125,
        ..Config::default()
    };
    assert_eq!(
        config.timeout_duration().unwrap(),
        Some(Duration::from_millis(500))
    );
    assert_eq!(
        config.check_interval_duration().unwrap(),
        Duration::from_micros(125_000)
    );
}
