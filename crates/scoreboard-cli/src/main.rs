// crates/scoreboard-cli/src/main.rs
// ============================================================================
// Module: Scoreboard CLI Entry Point
// Description: Command dispatcher for the Scoreboard HTTP service.
// Purpose: Provide a small, validated CLI for serving and config checks.
// Dependencies: clap, scoreboard-config, scoreboard-server, thiserror, tokio
// ============================================================================

//! ## Overview
//! The Scoreboard CLI starts the HTTP service and validates configuration
//! files without starting anything. Security posture: inputs are untrusted
//! and must be validated; see `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use scoreboard_config::ScoreboardConfig;
use scoreboard_server::ScoreboardServer;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "scoreboard", version, about = "Scoreboard telemetry service")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Scoreboard HTTP service.
    Serve {
        /// Optional config file path (defaults to scoreboard.toml or env override).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file and exit.
    CheckConfig {
        /// Optional config file path (defaults to scoreboard.toml or env override).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            config,
        } => command_serve(config).await,
        Commands::CheckConfig {
            config,
        } => command_check_config(config),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Loads configuration and runs the HTTP service until it exits.
async fn command_serve(config_path: Option<PathBuf>) -> CliResult<ExitCode> {
    let config = ScoreboardConfig::load(config_path.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let server = ScoreboardServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to build server: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Validates a configuration file without starting the service.
fn command_check_config(config_path: Option<PathBuf>) -> CliResult<ExitCode> {
    let config = ScoreboardConfig::load(config_path.as_deref())
        .map_err(|err| CliError::new(format!("config check failed: {err}")))?;
    let store_path = config.store_path();
    let backup_path = config.backup_path();
    write_stdout_line(&format!(
        "config ok: store={}, backup={}",
        store_path.display(),
        backup_path.display()
    ))
    .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes the error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
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

    use std::fs;

    use clap::CommandFactory;
    use tempfile::TempDir;

    use super::*;

    /// Verifies the clap definition is internally consistent.
    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    /// Verifies check-config accepts a valid file.
    #[test]
    fn check_config_accepts_valid_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("scoreboard.toml");
        fs::write(
            &path,
            r#"
[server]
admin_password = "valid-password"
"#,
        )
        .expect("write config");
        let result = command_check_config(Some(path));
        assert!(result.is_ok());
    }

    /// Verifies check-config rejects an invalid file.
    #[test]
    fn check_config_rejects_invalid_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("scoreboard.toml");
        fs::write(
            &path,
            r#"
[server]
admin_password = "short"
"#,
        )
        .expect("write config");
        let result = command_check_config(Some(path));
        assert!(result.is_err());
    }

    /// Verifies check-config reports a missing file as an error.
    #[test]
    fn check_config_reports_missing_file() {
        let result = command_check_config(Some(PathBuf::from("does/not/exist.toml")));
        assert!(result.is_err());
    }
}
