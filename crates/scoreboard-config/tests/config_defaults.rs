// crates/scoreboard-config/tests/config_defaults.rs
// ============================================================================
// Module: Config Defaults Tests
// Description: Default-value tests for the Scoreboard configuration model.
// Purpose: Ensure omitted sections resolve to the documented defaults.
// Dependencies: scoreboard-config
// ============================================================================
//! ## Overview
//! Validates section defaults and mode-driven storage path resolution.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::PathBuf;

use scoreboard_config::DeploymentMode;
use scoreboard_config::ScoreboardConfig;

const MINIMAL: &str = r#"
[server]
admin_password = "correct-horse"
"#;

/// Verifies omitted sections resolve to documented defaults.
#[test]
fn minimal_config_uses_defaults() {
    let config = ScoreboardConfig::from_toml_str(MINIMAL).unwrap();
    assert_eq!(config.server.max_body_bytes, 65_536);
    assert_eq!(config.backup.interval_secs, 300);
    assert_eq!(config.ingest.rate_limit_max_requests, 1);
    assert_eq!(config.ingest.rate_limit_window_ms, 20_000);
    assert_eq!(config.store.busy_timeout_ms, 5_000);
    assert!(config.maintenance.protected_tables.is_empty());
    assert_eq!(config.mode, DeploymentMode::Local);
}

/// Verifies local mode resolves storage paths under the data directory.
#[test]
fn local_mode_resolves_data_directory_paths() {
    let config = ScoreboardConfig::from_toml_str(MINIMAL).unwrap();
    assert_eq!(config.store_path(), PathBuf::from("data/scoreboard.db"));
    assert_eq!(config.backup_path(), PathBuf::from("data/scoreboard.backup.db"));
}

/// Verifies deployed mode resolves storage paths under the state directory.
#[test]
fn deployed_mode_resolves_state_directory_paths() {
    let content = r#"
mode = "deployed"

[server]
admin_password = "correct-horse"
"#;
    let config = ScoreboardConfig::from_toml_str(content).unwrap();
    assert_eq!(config.store_path(), PathBuf::from("/var/lib/scoreboard/scoreboard.db"));
    assert_eq!(config.backup_path(), PathBuf::from("/var/lib/scoreboard/scoreboard.backup.db"));
}

/// Verifies explicit store paths override mode defaults.
#[test]
fn explicit_paths_override_mode_defaults() {
    let content = r#"
mode = "deployed"

[server]
admin_password = "correct-horse"

[store]
path = "custom/live.db"
backup_path = "custom/backup.db"
"#;
    let config = ScoreboardConfig::from_toml_str(content).unwrap();
    assert_eq!(config.store_path(), PathBuf::from("custom/live.db"));
    assert_eq!(config.backup_path(), PathBuf::from("custom/backup.db"));
}

/// Verifies the limiter settings mirror the ingest section.
#[test]
fn limiter_config_mirrors_ingest_section() {
    let content = r#"
[server]
admin_password = "correct-horse"

[ingest]
rate_limit_max_requests = 3
rate_limit_window_ms = 45000
"#;
    let config = ScoreboardConfig::from_toml_str(content).unwrap();
    let limiter = config.ingest.limiter_config().unwrap();
    assert_eq!(limiter.max_requests, 3);
    assert_eq!(limiter.window_ms, 45_000);
}
