// crates/scoreboard-server/src/server.rs
// ============================================================================
// Module: Scoreboard HTTP Server
// Description: Router, handlers, and serve loop for the Scoreboard API.
// Purpose: Expose ingestion, leaderboard, and maintenance routes over HTTP.
// Dependencies: scoreboard-core, scoreboard-config, scoreboard-store-sqlite,
//               axum, tokio, serde, serde_json
// ============================================================================

//! ## Overview
//! The server wires one shared [`ServerState`] into an axum router. Public
//! routes cover submission ingestion (lock, then rate limit, then validate,
//! then insert), the ranked leaderboard read, and a readiness probe. Admin
//! routes require the shared Basic credential and cover rename, clear,
//! restore, backup scheduling, the submissions lock, and synthetic data
//! loading. Security posture: HTTP inputs are untrusted; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use scoreboard_config::ScoreboardConfig;
use scoreboard_core::AdminAuditEvent;
use scoreboard_core::AuditSink;
use scoreboard_core::GameProgressRecord;
use scoreboard_core::LogicalTable;
use scoreboard_core::ProgressStore;
use scoreboard_core::SlidingWindowLimiter;
use scoreboard_core::StderrAuditSink;
use scoreboard_core::StoreError;
use scoreboard_core::SubmissionAuditEvent;
use scoreboard_core::SubmissionGate;
use scoreboard_core::SubmissionRequest;
use scoreboard_core::extract_time_of_day;
use scoreboard_store_sqlite::SqliteProgressStore;
use scoreboard_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::auth::require_admin;
use crate::backup::BackupScheduler;
use crate::backup::BackupState;
use crate::error::ApiError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default synthetic row count when the request omits `count`.
const DEFAULT_SYNTHETIC_COUNT: usize = 30;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server construction and transport errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ScoreboardServerError {
    /// Invalid server configuration.
    #[error("server config error: {0}")]
    Config(String),
    /// Server initialization failure.
    #[error("server init error: {0}")]
    Init(String),
    /// Transport-level failure.
    #[error("server transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state behind every handler.
///
/// # Invariants
/// - The store is the single source of truth; the gate and limiter are
///   process-lifetime admission controls in front of it.
pub struct ServerState {
    /// Progress store backing all reads and writes.
    store: Arc<dyn ProgressStore>,
    /// Submission lock consulted before any other ingestion work.
    gate: SubmissionGate,
    /// Per-source sliding-window rate limiter.
    limiter: SlidingWindowLimiter,
    /// Backup scheduler controlled by the admin routes.
    scheduler: BackupScheduler,
    /// Audit sink for ingestion and maintenance outcomes.
    sink: Arc<dyn AuditSink>,
    /// Shared admin credential for maintenance routes.
    admin_password: String,
    /// Maximum accepted request body size in bytes.
    max_body_bytes: usize,
    /// Snapshot path used by restore.
    backup_path: PathBuf,
}

/// Builds the shared server state from validated configuration.
///
/// # Errors
///
/// Returns [`ScoreboardServerError`] when the store cannot be opened or the
/// limiter settings do not convert.
pub fn build_state(config: &ScoreboardConfig) -> Result<ServerState, ScoreboardServerError> {
    let sink: Arc<dyn AuditSink> = Arc::new(StderrAuditSink);
    let store_config = SqliteStoreConfig {
        path: config.store_path(),
        busy_timeout_ms: config.store.busy_timeout_ms,
        journal_mode: config.store.journal_mode,
        sync_mode: config.store.sync_mode,
        protected_tables: config.maintenance.protected_logical_tables(),
    };
    let store = SqliteProgressStore::new(store_config)
        .map_err(|err| ScoreboardServerError::Init(err.to_string()))?;
    let store: Arc<dyn ProgressStore> = Arc::new(store);
    let limiter_config = config
        .ingest
        .limiter_config()
        .map_err(|err| ScoreboardServerError::Config(err.to_string()))?;
    let limiter = SlidingWindowLimiter::new(limiter_config, Arc::clone(&sink));
    let scheduler = BackupScheduler::new(
        Arc::clone(&store),
        config.backup_path(),
        Duration::from_secs(config.backup.interval_secs),
        Arc::clone(&sink),
    );
    Ok(ServerState {
        store,
        gate: SubmissionGate::new(),
        limiter,
        scheduler,
        sink,
        admin_password: config.server.admin_password.clone(),
        max_body_bytes: config.server.max_body_bytes,
        backup_path: config.backup_path(),
    })
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Successful submission response.
#[derive(Debug, Serialize)]
struct SubmitResponse {
    /// Always `true` for successes.
    success: bool,
    /// Human-readable outcome description.
    message: String,
    /// Identifier assigned to the stored record.
    id: i64,
}

/// Generic success envelope.
#[derive(Debug, Serialize)]
struct StatusResponse {
    /// Always `true` for successes.
    success: bool,
    /// Human-readable outcome description.
    message: String,
}

/// Rename request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ReplaceNameRequest {
    /// Exact stored name to match.
    find_name: String,
    /// Replacement name.
    replace_name: String,
}

/// Rename response body.
#[derive(Debug, Serialize)]
struct ReplaceNameResponse {
    /// Always `true` for successes.
    success: bool,
    /// Human-readable outcome description.
    message: String,
    /// Number of rows updated.
    rows_affected: u64,
}

/// Clear-table request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ClearTableRequest {
    /// Logical table name to clear.
    table_name: String,
}

/// Backup status response body.
#[derive(Debug, Serialize)]
struct BackupStatusResponse {
    /// Always `true` for successes.
    success: bool,
    /// Scheduler lifecycle state.
    state: BackupState,
}

/// Submissions-lock status response body.
#[derive(Debug, Serialize)]
struct LockStatusResponse {
    /// Always `true` for successes.
    success: bool,
    /// Current lock state.
    locked: bool,
}

/// Submissions-lock set request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LockSetRequest {
    /// Desired lock state.
    locked: bool,
}

/// Submissions-lock set response body.
#[derive(Debug, Serialize)]
struct LockSetResponse {
    /// Always `true` for successes.
    success: bool,
    /// Human-readable outcome description.
    message: String,
    /// Lock state before this request.
    previous: bool,
}

/// Synthetic-load request body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoadMockRequest {
    /// Requested row count; defaults when omitted.
    count: Option<usize>,
}

/// Synthetic-load response body.
#[derive(Debug, Serialize)]
struct LoadMockResponse {
    /// Always `true` for successes.
    success: bool,
    /// Human-readable outcome description.
    message: String,
    /// Number of rows inserted.
    inserted: usize,
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the service router over shared state.
#[must_use]
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/data", post(handle_submit))
        .route("/api/gamedata", get(handle_gamedata))
        .route("/healthz", get(handle_healthz))
        .route("/api/replace-name", post(handle_replace_name))
        .route("/api/clear-table", delete(handle_clear_table))
        .route("/api/restore-db", post(handle_restore_db))
        .route("/api/backup-service/start", post(handle_backup_start))
        .route("/api/backup-service/stop", post(handle_backup_stop))
        .route("/api/backup-service/status", get(handle_backup_status))
        .route("/api/submissions-lock/status", get(handle_lock_status))
        .route("/api/submissions-lock/set", post(handle_lock_set))
        .route("/api/load-mock-data", post(handle_load_mock))
        .with_state(state)
}

// ============================================================================
// SECTION: Public Handlers
// ============================================================================

/// Handles a submission: lock, rate limit, validate, then insert.
async fn handle_submit(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    bytes: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let source = peer.ip().to_string();
    if state.gate.is_locked() {
        state
            .sink
            .record_submission(&SubmissionAuditEvent::rejected("", Some(&source), "locked"));
        return Err(ApiError::Locked);
    }
    let admission = state.limiter.admit(&source, unix_millis_now());
    if !admission.allowed {
        state.sink.record_submission(&SubmissionAuditEvent::rejected(
            "",
            Some(&source),
            "rate_limited",
        ));
        return Err(ApiError::RateLimited {
            retry_after_seconds: admission.retry_after_seconds.unwrap_or(1),
        });
    }
    let request: SubmissionRequest = parse_body(&state, &bytes)?;
    if let Err(err) = request.validate() {
        state.sink.record_submission(&SubmissionAuditEvent::rejected(
            &request.name,
            Some(&source),
            "validation_failed",
        ));
        return Err(ApiError::Validation(err.to_string()));
    }
    if state.store.exists_case_insensitive(&request.name)? {
        state.sink.record_submission(&SubmissionAuditEvent::rejected(
            &request.name,
            Some(&source),
            "duplicate_name",
        ));
        return Err(ApiError::DuplicateName(request.name));
    }
    let id = match state.store.insert(&request) {
        Ok(id) => id,
        Err(StoreError::DuplicateName(name)) => {
            state.sink.record_submission(&SubmissionAuditEvent::rejected(
                &name,
                Some(&source),
                "duplicate_name",
            ));
            return Err(ApiError::DuplicateName(name));
        }
        Err(err) => return Err(ApiError::from(err)),
    };
    state.sink.record_submission(&SubmissionAuditEvent::accepted(
        &request.name,
        Some(&source),
        extract_time_of_day(&request.timestamp),
    ));
    Ok(Json(SubmitResponse {
        success: true,
        message: "submission stored".to_string(),
        id,
    }))
}

/// Handles the ranked leaderboard read.
async fn handle_gamedata(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<GameProgressRecord>>, ApiError> {
    let records = state.store.list_ranked()?;
    Ok(Json(records))
}

/// Handles the readiness probe.
async fn handle_healthz(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.store.readiness()?;
    Ok(Json(StatusResponse {
        success: true,
        message: "ready".to_string(),
    }))
}

// ============================================================================
// SECTION: Admin Handlers
// ============================================================================

/// Handles an exact-match rename across stored records.
async fn handle_replace_name(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<Json<ReplaceNameResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "replace_name")?;
    let request: ReplaceNameRequest = parse_body(&state, &bytes)?;
    if request.find_name.is_empty() || request.replace_name.is_empty() {
        return Err(ApiError::Validation("findName and replaceName must be non-empty".to_string()));
    }
    let rows_affected = state.store.rename(&request.find_name, &request.replace_name)?;
    let outcome = if rows_affected == 0 { "no_match" } else { "ok" };
    state.sink.record_admin(&AdminAuditEvent::new(
        "replace_name",
        outcome,
        Some(format!("{} -> {}", request.find_name, request.replace_name)),
    ));
    let message = if rows_affected == 0 {
        format!("no records matched name {}", request.find_name)
    } else {
        format!("renamed {rows_affected} records")
    };
    Ok(Json(ReplaceNameResponse {
        success: true,
        message,
        rows_affected,
    }))
}

/// Handles clearing a logical table.
async fn handle_clear_table(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "clear_table")?;
    let request: ClearTableRequest = parse_body(&state, &bytes)?;
    let table = LogicalTable::from_request_name(&request.table_name)
        .ok_or_else(|| ApiError::Validation(format!("unknown table: {}", request.table_name)))?;
    state.store.clear(table)?;
    state.sink.record_admin(&AdminAuditEvent::new(
        "clear_table",
        "ok",
        Some(request.table_name.clone()),
    ));
    Ok(Json(StatusResponse {
        success: true,
        message: format!("cleared table {}", request.table_name),
    }))
}

/// Handles restoring the live database from the snapshot.
async fn handle_restore_db(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "restore_db")?;
    state.store.restore_from(&state.backup_path)?;
    state.sink.record_admin(&AdminAuditEvent::new("restore_db", "ok", None));
    Ok(Json(StatusResponse {
        success: true,
        message: "database restored from snapshot".to_string(),
    }))
}

/// Handles starting the backup scheduler.
async fn handle_backup_start(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "backup_start")?;
    state.scheduler.start().await?;
    state.sink.record_admin(&AdminAuditEvent::new("backup_start", "ok", None));
    Ok(Json(StatusResponse {
        success: true,
        message: "backup service started".to_string(),
    }))
}

/// Handles stopping the backup scheduler.
async fn handle_backup_stop(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "backup_stop")?;
    state.scheduler.stop().await?;
    state.sink.record_admin(&AdminAuditEvent::new("backup_stop", "ok", None));
    Ok(Json(StatusResponse {
        success: true,
        message: "backup service stopped".to_string(),
    }))
}

/// Handles reading the backup scheduler state.
async fn handle_backup_status(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<BackupStatusResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "backup_status")?;
    let backup_state = state.scheduler.status().await;
    Ok(Json(BackupStatusResponse {
        success: true,
        state: backup_state,
    }))
}

/// Handles reading the submissions lock.
async fn handle_lock_status(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<LockStatusResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "lock_status")?;
    Ok(Json(LockStatusResponse {
        success: true,
        locked: state.gate.is_locked(),
    }))
}

/// Handles setting the submissions lock.
async fn handle_lock_set(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<Json<LockSetResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "lock_set")?;
    let request: LockSetRequest = parse_body(&state, &bytes)?;
    let previous = state.gate.set_locked(request.locked);
    state.sink.record_admin(&AdminAuditEvent::new(
        "lock_set",
        "ok",
        Some(format!("locked={}", request.locked)),
    ));
    let message = if request.locked {
        "submissions locked".to_string()
    } else {
        "submissions unlocked".to_string()
    };
    Ok(Json(LockSetResponse {
        success: true,
        message,
        previous,
    }))
}

/// Handles loading synthetic leaderboard rows.
async fn handle_load_mock(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<Json<LoadMockResponse>, ApiError> {
    require_admin(&headers, &state.admin_password, state.sink.as_ref(), "load_mock_data")?;
    let count = if bytes.is_empty() {
        DEFAULT_SYNTHETIC_COUNT
    } else {
        let request: LoadMockRequest = parse_body(&state, &bytes)?;
        request.count.unwrap_or(DEFAULT_SYNTHETIC_COUNT)
    };
    let inserted = state.store.load_synthetic(count)?;
    state
        .sink
        .record_admin(&AdminAuditEvent::new("load_mock_data", "ok", Some(inserted.to_string())));
    Ok(Json(LoadMockResponse {
        success: true,
        message: format!("inserted {inserted} synthetic records"),
        inserted,
    }))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Enforces the body-size limit and parses a JSON request body.
fn parse_body<T: DeserializeOwned>(state: &ServerState, bytes: &Bytes) -> Result<T, ApiError> {
    if bytes.len() > state.max_body_bytes {
        return Err(ApiError::PayloadTooLarge);
    }
    serde_json::from_slice(bytes)
        .map_err(|err| ApiError::Validation(format!("invalid request body: {err}")))
}

/// Current time as unix milliseconds for limiter decisions.
fn unix_millis_now() -> i64 {
    let millis =
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    i64::try_from(millis).unwrap_or(i64::MAX)
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Scoreboard HTTP server entry point.
///
/// # Invariants
/// - Configuration is validated before any resource is opened.
pub struct ScoreboardServer {
    /// Validated service configuration.
    config: ScoreboardConfig,
}

impl ScoreboardServer {
    /// Creates a server from configuration, validating it first.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreboardServerError::Config`] when validation fails.
    pub fn from_config(config: ScoreboardConfig) -> Result<Self, ScoreboardServerError> {
        config.validate().map_err(|err| ScoreboardServerError::Config(err.to_string()))?;
        Ok(Self { config })
    }

    /// Runs the HTTP server until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreboardServerError`] when the bind address is missing or
    /// invalid, state construction fails, or the transport fails.
    pub async fn serve(self) -> Result<(), ScoreboardServerError> {
        let bind = self.config.server.bind.clone().ok_or_else(|| {
            ScoreboardServerError::Config("server.bind must be set".to_string())
        })?;
        let addr: SocketAddr = bind.parse().map_err(|_| {
            ScoreboardServerError::Config(format!("server.bind is not a valid socket address: {bind}"))
        })?;
        let state = Arc::new(build_state(&self.config)?);
        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| ScoreboardServerError::Transport(err.to_string()))?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|err| ScoreboardServerError::Transport(err.to_string()))?;
        Ok(())
    }
}
