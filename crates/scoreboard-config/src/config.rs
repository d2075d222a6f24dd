// crates/scoreboard-config/src/config.rs
// ============================================================================
// Module: Scoreboard Configuration
// Description: Configuration loading and validation for Scoreboard.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: scoreboard-core, scoreboard-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed to preserve security posture.
//! Security posture: config inputs are untrusted; see `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use scoreboard_core::LimiterConfig;
use scoreboard_core::LogicalTable;
use scoreboard_store_sqlite::SqliteStoreMode;
use scoreboard_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "scoreboard.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SCOREBOARD_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum admin credential length.
pub(crate) const MIN_ADMIN_PASSWORD_LENGTH: usize = 8;
/// Maximum admin credential length.
pub(crate) const MAX_ADMIN_PASSWORD_LENGTH: usize = 256;
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 65_536;
/// Default backup interval in seconds.
pub(crate) const DEFAULT_BACKUP_INTERVAL_SECS: u64 = 300;
/// Maximum backup interval in seconds.
pub(crate) const MAX_BACKUP_INTERVAL_SECS: u64 = 86_400;
/// Default max admitted submissions per rate-limit window.
pub(crate) const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 1;
/// Default rate-limit window in milliseconds.
pub(crate) const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 20_000;
/// Minimum allowed rate-limit window in milliseconds.
pub(crate) const MIN_RATE_LIMIT_WINDOW_MS: u64 = 100;
/// Maximum allowed rate-limit window in milliseconds.
pub(crate) const MAX_RATE_LIMIT_WINDOW_MS: u64 = 600_000;
/// Maximum allowed requests per rate-limit window.
pub(crate) const MAX_RATE_LIMIT_REQUESTS: u32 = 100_000;
/// Default SQLite busy timeout in milliseconds.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum SQLite busy timeout in milliseconds.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Live database filename under the mode-selected data directory.
const DEFAULT_DB_FILENAME: &str = "scoreboard.db";
/// Backup database filename under the mode-selected data directory.
const DEFAULT_BACKUP_FILENAME: &str = "scoreboard.backup.db";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Scoreboard service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Progress store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Backup scheduler configuration.
    #[serde(default)]
    pub backup: BackupConfig,
    /// Submission ingestion configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Maintenance operation configuration.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Deployment mode selecting storage defaults.
    #[serde(default)]
    pub mode: DeploymentMode,
}

impl ScoreboardConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.backup.validate()?;
        self.ingest.validate()?;
        self.maintenance.validate()?;
        Ok(())
    }

    /// Returns the effective live database path for the configured mode.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| self.mode.data_dir().join(DEFAULT_DB_FILENAME))
    }

    /// Returns the effective backup snapshot path for the configured mode.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.store
            .backup_path
            .clone()
            .unwrap_or_else(|| self.mode.data_dir().join(DEFAULT_BACKUP_FILENAME))
    }
}

/// Deployment mode selecting the default storage directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    /// Local development deployment; data lives beside the binary.
    #[default]
    Local,
    /// Deployed service; data lives under the service state directory.
    Deployed,
}

impl DeploymentMode {
    /// Returns the default data directory for this mode.
    #[must_use]
    pub fn data_dir(self) -> PathBuf {
        match self {
            Self::Local => PathBuf::from("data"),
            Self::Deployed => PathBuf::from("/var/lib/scoreboard"),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default)]
    pub bind: Option<String>,
    /// Shared admin credential for maintenance routes.
    #[serde(default)]
    pub admin_password: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: None,
            admin_password: String::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(bind) = &self.bind
            && bind.parse::<SocketAddr>().is_err()
        {
            return Err(ConfigError::Invalid(format!(
                "server.bind is not a valid socket address: {bind}"
            )));
        }
        if self.admin_password.is_empty() {
            return Err(ConfigError::Invalid("server.admin_password must be set".to_string()));
        }
        if self.admin_password.len() < MIN_ADMIN_PASSWORD_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "server.admin_password must be at least {MIN_ADMIN_PASSWORD_LENGTH} characters"
            )));
        }
        if self.admin_password.len() > MAX_ADMIN_PASSWORD_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "server.admin_password must be at most {MAX_ADMIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// Progress store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Live database path; defaults from the deployment mode when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Backup snapshot path; defaults from the deployment mode when unset.
    #[serde(default)]
    pub backup_path: Option<PathBuf>,
    /// SQLite journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// SQLite synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in [("store.path", &self.path), ("store.backup_path", &self.backup_path)]
        {
            if let Some(path) = path {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid(format!("{field} must not be empty")));
                }
                if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
                    return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
                }
            }
        }
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "store.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Backup scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupConfig {
    /// Interval between scheduled snapshots in seconds.
    #[serde(default = "default_backup_interval_secs")]
    pub interval_secs: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_backup_interval_secs(),
        }
    }
}

impl BackupConfig {
    /// Validates backup configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "backup.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.interval_secs > MAX_BACKUP_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "backup.interval_secs must be at most {MAX_BACKUP_INTERVAL_SECS}"
            )));
        }
        Ok(())
    }
}

/// Submission ingestion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Maximum admitted submissions per rate-limit window.
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,
    /// Rate-limit window length in milliseconds.
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_ms: default_rate_limit_window_ms(),
        }
    }
}

impl IngestConfig {
    /// Validates ingestion configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_max_requests == 0 {
            return Err(ConfigError::Invalid(
                "ingest.rate_limit_max_requests must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit_max_requests > MAX_RATE_LIMIT_REQUESTS {
            return Err(ConfigError::Invalid(format!(
                "ingest.rate_limit_max_requests must be at most {MAX_RATE_LIMIT_REQUESTS}"
            )));
        }
        if self.rate_limit_window_ms < MIN_RATE_LIMIT_WINDOW_MS {
            return Err(ConfigError::Invalid(format!(
                "ingest.rate_limit_window_ms must be at least {MIN_RATE_LIMIT_WINDOW_MS}"
            )));
        }
        if self.rate_limit_window_ms > MAX_RATE_LIMIT_WINDOW_MS {
            return Err(ConfigError::Invalid(format!(
                "ingest.rate_limit_window_ms must be at most {MAX_RATE_LIMIT_WINDOW_MS}"
            )));
        }
        Ok(())
    }

    /// Returns the limiter settings for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when values do not fit the limiter types;
    /// validation bounds make this unreachable for validated configs.
    pub fn limiter_config(&self) -> Result<LimiterConfig, ConfigError> {
        let max_requests = usize::try_from(self.rate_limit_max_requests)
            .map_err(|_| ConfigError::Invalid("rate_limit_max_requests overflow".to_string()))?;
        let window_ms = i64::try_from(self.rate_limit_window_ms)
            .map_err(|_| ConfigError::Invalid("rate_limit_window_ms overflow".to_string()))?;
        Ok(LimiterConfig {
            max_requests,
            window_ms,
        })
    }
}

/// Maintenance operation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaintenanceConfig {
    /// Logical tables protected from destructive maintenance.
    #[serde(default)]
    pub protected_tables: Vec<String>,
}

impl MaintenanceConfig {
    /// Validates maintenance configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.protected_tables {
            if LogicalTable::from_request_name(name).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "maintenance.protected_tables contains unknown table: {name}"
                )));
            }
        }
        Ok(())
    }

    /// Returns the protected logical tables.
    #[must_use]
    pub fn protected_logical_tables(&self) -> Vec<LogicalTable> {
        self.protected_tables
            .iter()
            .filter_map(|name| LogicalTable::from_request_name(name))
            .collect()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default SQLite busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Default backup interval.
const fn default_backup_interval_secs() -> u64 {
    DEFAULT_BACKUP_INTERVAL_SECS
}

/// Default rate-limit quota.
const fn default_rate_limit_max_requests() -> u32 {
    DEFAULT_RATE_LIMIT_MAX_REQUESTS
}

/// Default rate-limit window.
const fn default_rate_limit_window_ms() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_MS
}
