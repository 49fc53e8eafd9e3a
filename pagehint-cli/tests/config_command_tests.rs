//! Integration tests for `pagehint config`.
//!
//! Tests config validation and display with real TOML files.

use std::fs;

use pagehint_cli::commands::{self, config};
use serial_test::serial;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("pagehint.toml");
    fs::write(&path, content).expect("should write config");
    path
}

#[tokio::test]
#[serial]
async fn test_config_validate_example_file() {
    // Given: the shipped example configuration
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&temp_dir, include_str!("../../pagehint.toml.example"));

    // When
    let report = config::validate(Some(&path)).await;

    // Then
    assert!(report.valid, "{:?}", report.errors);
    assert_eq!(report.source, path.display().to_string());
}

#[tokio::test]
#[serial]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&temp_dir, "[general\nlog_level = \"info\"\n");

    let report = config::validate(Some(&path)).await;

    assert!(!report.valid, "malformed TOML should be invalid");
    assert_eq!(report.errors.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_config_validate_missing_explicit_file() {
    let path = std::path::PathBuf::from("/nonexistent/pagehint.toml");

    let report = config::validate(Some(&path)).await;

    assert!(!report.valid, "missing file should be invalid");
    assert!(report.errors[0].contains("/nonexistent/pagehint.toml"));
}

#[tokio::test]
#[serial]
async fn test_config_validate_rejects_bad_browser_and_hint_options() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&temp_dir, "[scan]\nbrowsers = [\"netscape\"]\n");
    let report = config::validate(Some(&path)).await;
    assert!(!report.valid, "browser without version should be invalid");

    let path = write_config(
        &temp_dir,
        "[hints.no-disallowed-headers.options]\ninclude = \"x-debug\"\n",
    );
    let report = config::validate(Some(&path)).await;
    assert!(!report.valid);
    assert!(
        report.errors[0].contains("hints.no-disallowed-headers.options"),
        "{:?}",
        report.errors
    );
}

#[tokio::test]
#[serial]
async fn test_config_show_reflects_file() {
    // Given
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(
        &temp_dir,
        r#"
[general]
log_format = "json"

[scan]
browsers = ["firefox 115"]
fetch_subresources = false
"#,
    );

    // When
    let loaded = commands::load_config(Some(&path)).await.expect("load");
    let report = config::show(&loaded, Some("scan")).expect("show scan");

    // Then
    assert!(report.config_toml.contains("firefox 115"));
    assert!(report.config_toml.contains("fetch_subresources = false"));
    assert_eq!(report.config["general"]["log_format"], "json");
}

#[tokio::test]
#[serial]
async fn test_config_load_failure_exit_code() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&temp_dir, "[general]\nlog_level = \"loud\"\n");

    let err = commands::load_config(Some(&path))
        .await
        .expect_err("invalid log level");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[serial]
async fn test_env_override_wins_over_file() {
    // Given: a file that pins one browser and an env var that replaces the list
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = write_config(&temp_dir, "[scan]\nbrowsers = [\"chrome 120\"]\n");
    unsafe { std::env::set_var("PAGEHINT_SCAN_BROWSERS", "ie 11, edge 18") };

    // When
    let loaded = commands::load_config(Some(&path)).await;
    unsafe { std::env::remove_var("PAGEHINT_SCAN_BROWSERS") };

    // Then
    let loaded = loaded.expect("load");
    assert_eq!(loaded.config.scan.browsers, vec!["ie 11", "edge 18"]);
}
