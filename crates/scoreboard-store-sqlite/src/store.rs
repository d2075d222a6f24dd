// crates/scoreboard-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Progress Store
// Description: Durable ProgressStore backed by SQLite WAL.
// Purpose: Persist game-progress rows with storage-enforced name uniqueness.
// Dependencies: scoreboard-core, rand, rusqlite, serde, serde_json, time
// ============================================================================

//! ## Overview
//! This module implements a durable [`ProgressStore`] using `SQLite`. Rows
//! live in a single `game_progress` table; case-insensitive name uniqueness
//! is enforced by a unique index over `lower(name)` so check-then-insert
//! cannot race. The ranked leaderboard is served from a persisted view whose
//! ordering matches the in-memory comparator exactly. Snapshot and restore
//! swap whole database files under the store lock. Security posture:
//! database contents are untrusted; see `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rand::Rng;
use rand::seq::SliceRandom;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use scoreboard_core::GameProgressRecord;
use scoreboard_core::LogicalTable;
use scoreboard_core::NO_TIME_SENTINEL;
use scoreboard_core::ProgressStore;
use scoreboard_core::StoreError;
use scoreboard_core::SubmissionRequest;
use scoreboard_core::display_timestamp;
use scoreboard_core::format_completion_time;
use serde::Deserialize;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum rows accepted by a single synthetic load.
pub const MAX_SYNTHETIC_ROWS: usize = 1_000;
/// Function palette used for synthetic telemetry rows.
const SYNTHETIC_FUNCTION_PALETTE: [&str; 6] =
    ["moveForward", "turnLeft", "turnRight", "collectItem", "openDoor", "repeatLoop"];
/// Minimum synthetic completion time in milliseconds (30 seconds).
const MIN_SYNTHETIC_COMPLETION_MS: i64 = 30_000;
/// Maximum synthetic completion time in milliseconds (2 hours).
const MAX_SYNTHETIC_COMPLETION_MS: i64 = 7_200_000;
/// Maximum synthetic timestamp age in seconds (24 hours).
const MAX_SYNTHETIC_AGE_SECONDS: i64 = 86_400;
/// Insert statement shared by ingestion and synthetic loading.
const INSERT_PROGRESS_SQL: &str = "INSERT INTO game_progress (name, level, function_details, \
                                   total_functions, completion_time_ms, \
                                   completion_time_formatted, timestamp) VALUES (?1, ?2, ?3, ?4, \
                                   ?5, ?6, ?7)";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` progress store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `protected_tables` lists logical tables that `clear` must refuse.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Logical tables protected from destructive maintenance.
    #[serde(default)]
    pub protected_tables: Vec<LogicalTable>,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw row payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or request.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A row with the same name already exists (case-insensitive).
    #[error("sqlite store duplicate name: {0}")]
    DuplicateName(String),
    /// The logical table is protected from maintenance mutation.
    #[error("sqlite store table protected: {0}")]
    Forbidden(String),
    /// The requested snapshot file does not exist.
    #[error("sqlite store snapshot missing: {0}")]
    SnapshotMissing(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Db(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::DuplicateName(name) => Self::DuplicateName(name),
            SqliteStoreError::Forbidden(table) => Self::Forbidden(table),
            SqliteStoreError::SnapshotMissing(path) => Self::SnapshotMissing(path),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed progress store with WAL support.
///
/// # Invariants
/// - All connection access is serialized through one mutex.
/// - The connection slot is `None` only while `restore_from` holds the lock,
///   so no other operation can observe a closed handle.
#[derive(Clone)]
pub struct SqliteProgressStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Live connection slot guarded by a mutex.
    connection: Arc<Mutex<Option<Connection>>>,
}

impl SqliteProgressStore {
    /// Opens an `SQLite`-backed progress store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(Some(connection))),
        })
    }

    /// Acquires the connection mutex.
    fn lock_connection(&self) -> Result<MutexGuard<'_, Option<Connection>>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    /// Returns the live connection from a held guard.
    fn live_connection<'guard>(
        guard: &'guard mut MutexGuard<'_, Option<Connection>>,
    ) -> Result<&'guard mut Connection, SqliteStoreError> {
        guard
            .as_mut()
            .ok_or_else(|| SqliteStoreError::Io("sqlite connection is closed".to_string()))
    }

    /// Probes for a row whose name matches case-insensitively.
    fn name_exists(&self, name: &str) -> Result<bool, SqliteStoreError> {
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        connection
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM game_progress WHERE lower(name) = lower(?1))",
                params![name],
                |row| row.get::<_, bool>(0),
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))
    }

    /// Inserts a validated submission and returns the assigned identifier.
    fn insert_submission(&self, request: &SubmissionRequest) -> Result<i64, SqliteStoreError> {
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        connection
            .execute(
                INSERT_PROGRESS_SQL,
                params![
                    request.name,
                    request.level,
                    request.function_details,
                    request.total_functions,
                    request.completion_time_ms,
                    request.completion_time_formatted,
                    request.timestamp
                ],
            )
            .map_err(|err| map_name_conflict(&err, &request.name))?;
        Ok(connection.last_insert_rowid())
    }

    /// Renames rows whose stored name matches `find` exactly.
    fn rename_rows(&self, find: &str, replace: &str) -> Result<u64, SqliteStoreError> {
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        let rows = connection
            .execute("UPDATE game_progress SET name = ?2 WHERE name = ?1", params![find, replace])
            .map_err(|err| map_name_conflict(&err, replace))?;
        Ok(u64::try_from(rows).unwrap_or(u64::MAX))
    }

    /// Deletes all rows from a logical table.
    ///
    /// The table definition and its identifier sequence survive: `DELETE`
    /// leaves the `sqlite_sequence` counter untouched, so identifiers are
    /// never reused after a clear.
    fn clear_table(&self, table: LogicalTable) -> Result<(), SqliteStoreError> {
        if self.config.protected_tables.contains(&table) {
            return Err(SqliteStoreError::Forbidden(table.request_name().to_string()));
        }
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        connection
            .execute(clear_statement(table), [])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Inserts `count` randomized rows in one all-or-nothing transaction.
    fn load_synthetic_rows(&self, count: usize) -> Result<usize, SqliteStoreError> {
        if count == 0 || count > MAX_SYNTHETIC_ROWS {
            return Err(SqliteStoreError::Invalid(format!(
                "synthetic row count out of range: {count} (max {MAX_SYNTHETIC_ROWS})"
            )));
        }
        let mut rng = rand::thread_rng();
        let batch = rng.r#gen::<u32>();
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        for index in 0 .. count {
            let request = synthetic_request(&mut rng, batch, index)?;
            tx.execute(
                INSERT_PROGRESS_SQL,
                params![
                    request.name,
                    request.level,
                    request.function_details,
                    request.total_functions,
                    request.completion_time_ms,
                    request.completion_time_formatted,
                    request.timestamp
                ],
            )
            .map_err(|err| map_name_conflict(&err, &request.name))?;
        }
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(count)
    }

    /// Lists all rows in leaderboard order from the ranked view.
    fn list_ranked_rows(&self) -> Result<Vec<GameProgressRecord>, SqliteStoreError> {
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        let mut statement = connection
            .prepare(
                "SELECT id, name, level, function_details, total_functions, completion_time_ms, \
                 completion_time_formatted, timestamp FROM game_progress_ranked",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], |row| {
                Ok(GameProgressRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    level: row.get(2)?,
                    function_details: row.get(3)?,
                    total_functions: row.get(4)?,
                    completion_time_ms: row.get(5)?,
                    completion_time_formatted: row.get(6)?,
                    timestamp: row.get(7)?,
                })
            })
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
        }
        Ok(records)
    }

    /// Writes a point-in-time copy of the live database file to `path`.
    fn snapshot_to_path(&self, path: &Path) -> Result<(), SqliteStoreError> {
        validate_store_path(path)?;
        ensure_parent_dir(path)?;
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        // Fold the WAL into the main file so the byte copy is complete.
        connection
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        std::fs::copy(&self.config.path, path)
            .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        Ok(())
    }

    /// Replaces the live database file with the snapshot at `path`.
    ///
    /// The live handle closes before the byte swap and reopens after it, all
    /// under the connection lock. If the copy fails the original file is
    /// reopened and the copy error reported. If reopening after a successful
    /// copy fails, the error is reported while the on-disk state remains the
    /// restored snapshot.
    fn restore_from_path(&self, path: &Path) -> Result<(), SqliteStoreError> {
        if !path.is_file() {
            return Err(SqliteStoreError::SnapshotMissing(path.display().to_string()));
        }
        let mut guard = self.lock_connection()?;
        if let Some(live) = guard.take()
            && let Err((live, err)) = live.close()
        {
            *guard = Some(live);
            return Err(SqliteStoreError::Db(err.to_string()));
        }
        if let Err(copy_err) = std::fs::copy(path, &self.config.path) {
            let reopened = open_connection(&self.config)?;
            *guard = Some(reopened);
            return Err(SqliteStoreError::Io(copy_err.to_string()));
        }
        let mut connection = open_connection(&self.config)?;
        initialize_schema(&mut connection)?;
        *guard = Some(connection);
        Ok(())
    }

    /// Verifies the store can execute a simple SQL statement.
    fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock_connection()?;
        let connection = Self::live_connection(&mut guard)?;
        connection
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|err| SqliteStoreError::Db(err.to_string()))
    }
}

impl ProgressStore for SqliteProgressStore {
    fn exists_case_insensitive(&self, name: &str) -> Result<bool, StoreError> {
        self.name_exists(name).map_err(StoreError::from)
    }

    fn insert(&self, request: &SubmissionRequest) -> Result<i64, StoreError> {
        self.insert_submission(request).map_err(StoreError::from)
    }

    fn rename(&self, find: &str, replace: &str) -> Result<u64, StoreError> {
        self.rename_rows(find, replace).map_err(StoreError::from)
    }

    fn clear(&self, table: LogicalTable) -> Result<(), StoreError> {
        self.clear_table(table).map_err(StoreError::from)
    }

    fn load_synthetic(&self, count: usize) -> Result<usize, StoreError> {
        self.load_synthetic_rows(count).map_err(StoreError::from)
    }

    fn list_ranked(&self) -> Result<Vec<GameProgressRecord>, StoreError> {
        self.list_ranked_rows().map_err(StoreError::from)
    }

    fn snapshot_to(&self, path: &Path) -> Result<(), StoreError> {
        self.snapshot_to_path(path).map_err(StoreError::from)
    }

    fn restore_from(&self, path: &Path) -> Result<(), StoreError> {
        self.restore_from_path(path).map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.check_connection().map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Synthetic Rows
// ============================================================================

/// Builds one schema-valid randomized submission.
fn synthetic_request(
    rng: &mut impl Rng,
    batch: u32,
    index: usize,
) -> Result<SubmissionRequest, SqliteStoreError> {
    let picked = rng.gen_range(1 ..= SYNTHETIC_FUNCTION_PALETTE.len());
    let mut details = serde_json::Map::new();
    let mut total_functions: i64 = 0;
    for name in SYNTHETIC_FUNCTION_PALETTE.choose_multiple(rng, picked) {
        let uses = rng.gen_range(1 ..= 5_i64);
        total_functions += uses;
        details.insert((*name).to_string(), serde_json::Value::from(uses));
    }
    let function_details = serde_json::to_string(&details)
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    let completion_time_ms =
        rng.gen_range(MIN_SYNTHETIC_COMPLETION_MS ..= MAX_SYNTHETIC_COMPLETION_MS);
    let age = Duration::seconds(rng.gen_range(0 .. MAX_SYNTHETIC_AGE_SECONDS));
    Ok(SubmissionRequest {
        name: format!("Tester-{batch:08x}-{index:03}"),
        level: rng.gen_range(1 ..= 10_i64),
        function_details,
        total_functions,
        completion_time_ms,
        completion_time_formatted: format_completion_time(completion_time_ms),
        timestamp: display_timestamp(OffsetDateTime::now_utc() - age),
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Classifies a write failure, mapping unique-index violations to duplicates.
fn map_name_conflict(err: &rusqlite::Error, name: &str) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = err
        && failure.code == ErrorCode::ConstraintViolation
    {
        return SqliteStoreError::DuplicateName(name.to_string());
    }
    SqliteStoreError::Db(err.to_string())
}

/// Returns the delete statement for a logical table.
///
/// Logical tables are an enumerated allow-list; real table names never come
/// from request text.
const fn clear_statement(table: LogicalTable) -> &'static str {
    match table {
        LogicalTable::GameProgress => "DELETE FROM game_progress",
    }
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS game_progress (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    level INTEGER NOT NULL,
                    function_details TEXT NOT NULL,
                    total_functions INTEGER NOT NULL,
                    completion_time_ms INTEGER NOT NULL,
                    completion_time_formatted TEXT NOT NULL,
                    timestamp TEXT NOT NULL
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_game_progress_name_ci
                    ON game_progress (lower(name));
                CREATE VIEW IF NOT EXISTS game_progress_ranked AS
                    SELECT id, name, level, function_details, total_functions,
                           completion_time_ms, completion_time_formatted, timestamp
                    FROM game_progress
                    ORDER BY
                        CASE WHEN completion_time_formatted = '{NO_TIME_SENTINEL}'
                             THEN 1 ELSE 0 END,
                        completion_time_ms,
                        id;"
            ))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
