// crates/scoreboard-core/src/interfaces.rs
// ============================================================================
// Module: Scoreboard Interfaces
// Description: Backend-agnostic interfaces for progress storage.
// Purpose: Define the contract surfaces used by the Scoreboard runtime.
// Dependencies: crate::record, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Scoreboard integrates with storage backends without
//! embedding backend-specific details. Implementations must be deterministic
//! and fail closed on missing or invalid data; in particular, name
//! uniqueness is a storage-layer guarantee, never a caller pre-check.
//!
//! Security posture: interface implementations consume untrusted inputs; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::record::GameProgressRecord;
use crate::record::SubmissionRequest;

// ============================================================================
// SECTION: Logical Tables
// ============================================================================

/// Logical tables exposed to maintenance operations.
///
/// Request-supplied table names map onto this enumerated allow-list; real
/// table names never travel over the wire and are never interpolated from
/// request text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalTable {
    /// The game-progress telemetry table.
    GameProgress,
}

impl LogicalTable {
    /// Resolves a request-supplied name against the allow-list.
    #[must_use]
    pub fn from_request_name(name: &str) -> Option<Self> {
        match name {
            "game_progress" => Some(Self::GameProgress),
            _ => None,
        }
    }

    /// Returns the stable request-facing name.
    #[must_use]
    pub const fn request_name(self) -> &'static str {
        match self {
            Self::GameProgress => "game_progress",
        }
    }
}

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Progress store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("progress store io error: {0}")]
    Io(String),
    /// Store driver error.
    #[error("progress store db error: {0}")]
    Db(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("progress store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("progress store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("progress store invalid data: {0}")]
    Invalid(String),
    /// A row with the same name already exists (case-insensitive).
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    /// The logical table is protected from maintenance mutation.
    #[error("table is protected: {0}")]
    Forbidden(String),
    /// The requested backup snapshot does not exist.
    #[error("snapshot not found: {0}")]
    SnapshotMissing(String),
}

// ============================================================================
// SECTION: Progress Store
// ============================================================================

/// Durable store for game-progress rows.
pub trait ProgressStore: Send + Sync {
    /// Checks whether a row with the given name exists, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the probe fails.
    fn exists_case_insensitive(&self, name: &str) -> Result<bool, StoreError>;

    /// Inserts a validated submission and returns the assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`] when the name collides
    /// case-insensitively, or another [`StoreError`] when the insert fails.
    fn insert(&self, request: &SubmissionRequest) -> Result<i64, StoreError>;

    /// Renames rows whose stored name matches `find` exactly.
    ///
    /// A zero return is a distinct reportable outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn rename(&self, find: &str, replace: &str) -> Result<u64, StoreError>;

    /// Deletes all rows from a logical table, preserving its definition and
    /// identifier sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Forbidden`] for protected tables, or another
    /// [`StoreError`] when the delete fails.
    fn clear(&self, table: LogicalTable) -> Result<(), StoreError>;

    /// Inserts `count` schema-valid randomized rows in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when generation or insertion fails; on failure
    /// no rows are inserted.
    fn load_synthetic(&self, count: usize) -> Result<usize, StoreError>;

    /// Lists all rows in leaderboard order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_ranked(&self) -> Result<Vec<GameProgressRecord>, StoreError>;

    /// Writes a point-in-time copy of the live store file to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the snapshot cannot be written.
    fn snapshot_to(&self, path: &Path) -> Result<(), StoreError>;

    /// Replaces the live store file with the snapshot at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SnapshotMissing`] when no snapshot exists at
    /// `path`, or another [`StoreError`] when the swap fails.
    fn restore_from(&self, path: &Path) -> Result<(), StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
