// crates/scoreboard-server/src/backup.rs
// ============================================================================
// Module: Scoreboard Backup Scheduler
// Description: Periodic snapshot task with explicit start/stop lifecycle.
// Purpose: Keep a rolling on-disk snapshot without operator intervention.
// Dependencies: scoreboard-core, tokio
// ============================================================================

//! ## Overview
//! The scheduler owns one optional tokio task. `start` takes an immediate
//! synchronous snapshot so a failing backup path is reported to the caller
//! instead of a background log, then spawns the interval task. `stop`
//! signals shutdown over a watch channel and awaits task termination, so no
//! snapshot can fire after it returns. Scheduled-tick failures are audited
//! and swallowed; the schedule continues.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scoreboard_core::AuditSink;
use scoreboard_core::BackupAuditEvent;
use scoreboard_core::ProgressStore;
use scoreboard_core::StoreError;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ApiError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupState {
    /// No snapshot task is running.
    Stopped,
    /// The snapshot task is running.
    Running,
}

/// Backup scheduler errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum BackupSchedulerError {
    /// `start` was called while the task is running.
    #[error("backup service is already running")]
    AlreadyRunning,
    /// `stop` was called while no task is running.
    #[error("backup service is not running")]
    NotRunning,
    /// The immediate snapshot taken by `start` failed.
    #[error(transparent)]
    Snapshot(#[from] StoreError),
}

impl From<BackupSchedulerError> for ApiError {
    fn from(err: BackupSchedulerError) -> Self {
        match err {
            BackupSchedulerError::AlreadyRunning | BackupSchedulerError::NotRunning => {
                Self::Conflict(err.to_string())
            }
            BackupSchedulerError::Snapshot(store_err) => Self::from(store_err),
        }
    }
}

/// Handle to a running snapshot task.
struct BackupTask {
    /// Shutdown signal; flipping to `true` stops the task.
    shutdown: watch::Sender<bool>,
    /// Join handle awaited by `stop`.
    handle: JoinHandle<()>,
}

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// Periodic snapshot scheduler over the progress store.
///
/// # Invariants
/// - At most one snapshot task exists at a time.
/// - After `stop` returns, no further snapshot fires.
pub struct BackupScheduler {
    /// Store snapshots are taken from.
    store: Arc<dyn ProgressStore>,
    /// Snapshot destination path.
    backup_path: PathBuf,
    /// Interval between scheduled snapshots.
    interval: Duration,
    /// Audit sink for lifecycle and tick outcomes.
    sink: Arc<dyn AuditSink>,
    /// Running task handle, when started.
    task: tokio::sync::Mutex<Option<BackupTask>>,
}

impl BackupScheduler {
    /// Creates a stopped scheduler.
    #[must_use]
    pub fn new(
        store: Arc<dyn ProgressStore>,
        backup_path: PathBuf,
        interval: Duration,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            backup_path,
            interval,
            sink,
            task: tokio::sync::Mutex::new(None),
        }
    }

    /// Starts the scheduler, taking an immediate snapshot first.
    ///
    /// # Errors
    ///
    /// Returns [`BackupSchedulerError::AlreadyRunning`] when started twice,
    /// or [`BackupSchedulerError::Snapshot`] when the immediate snapshot
    /// fails; in the failure case the scheduler stays stopped.
    pub async fn start(&self) -> Result<(), BackupSchedulerError> {
        let mut guard = self.task.lock().await;
        if guard.is_some() {
            return Err(BackupSchedulerError::AlreadyRunning);
        }
        if let Err(err) = self.store.snapshot_to(&self.backup_path) {
            self.sink.record_backup(&BackupAuditEvent::new(
                "start_failed",
                Some(err.to_string()),
            ));
            return Err(BackupSchedulerError::Snapshot(err));
        }
        self.sink.record_backup(&BackupAuditEvent::new("started", None));

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let backup_path = self.backup_path.clone();
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; start() already took the
            // initial snapshot, so consume it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match store.snapshot_to(&backup_path) {
                            Ok(()) => {
                                sink.record_backup(&BackupAuditEvent::new("tick_ok", None));
                            }
                            Err(err) => {
                                sink.record_backup(&BackupAuditEvent::new(
                                    "tick_failed",
                                    Some(err.to_string()),
                                ));
                            }
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        *guard = Some(BackupTask { shutdown, handle });
        Ok(())
    }

    /// Stops the scheduler and awaits task termination.
    ///
    /// # Errors
    ///
    /// Returns [`BackupSchedulerError::NotRunning`] when no task is running.
    pub async fn stop(&self) -> Result<(), BackupSchedulerError> {
        let task = {
            let mut guard = self.task.lock().await;
            guard.take()
        };
        let Some(task) = task else {
            return Err(BackupSchedulerError::NotRunning);
        };
        let _ = task.shutdown.send(true);
        if task.handle.await.is_err() {
            self.sink.record_backup(&BackupAuditEvent::new("stop_join_failed", None));
        }
        self.sink.record_backup(&BackupAuditEvent::new("stopped", None));
        Ok(())
    }

    /// Reports the scheduler lifecycle state.
    pub async fn status(&self) -> BackupState {
        if self.task.lock().await.is_some() {
            BackupState::Running
        } else {
            BackupState::Stopped
        }
    }
}
