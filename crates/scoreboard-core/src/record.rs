// crates/scoreboard-core/src/record.rs
// ============================================================================
// Module: Scoreboard Records
// Description: Game-progress records and submission requests with validation.
// Purpose: Define the canonical wire and storage shapes for telemetry rows.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A game client reports one progress row per completed session: a display
//! name, the reached level, per-function usage details, and a completion
//! time in both milliseconds and `HH:MM:SS` display form. Ingestion uses
//! camelCase keys; leaderboard responses use snake_case keys. Both shapes
//! are fixed serde renames over the same field set.
//!
//! Security posture: submission payloads are untrusted client input and are
//! validated before any storage work; see `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Completion-time display value marking a record with no valid time.
///
/// Records carrying this value always rank after every timed record.
pub const NO_TIME_SENTINEL: &str = "00:00:00";

// ============================================================================
// SECTION: Records
// ============================================================================

/// A stored game-progress row.
///
/// # Invariants
/// - `id` is assigned by the store, monotonic, and never reused.
/// - `name` is unique case-insensitively across all stored rows.
/// - `total_functions` and `completion_time_formatted` are client-supplied
///   and stored as received; the service never recomputes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgressRecord {
    /// Surrogate row identifier.
    pub id: i64,
    /// Player display name.
    pub name: String,
    /// Reached game level.
    pub level: i64,
    /// Serialized JSON text mapping function name to usage count.
    pub function_details: String,
    /// Total distinct functions reported by the client.
    pub total_functions: i64,
    /// Completion time in milliseconds; primary ranking key.
    pub completion_time_ms: i64,
    /// Completion time in `HH:MM:SS` display form.
    pub completion_time_formatted: String,
    /// Client-supplied composite display timestamp (`DD/MM/YYYY, HH:MM:SS`).
    pub timestamp: String,
}

impl GameProgressRecord {
    /// Returns true when the record carries the no-valid-time sentinel.
    #[must_use]
    pub fn is_unfinished(&self) -> bool {
        self.completion_time_formatted == NO_TIME_SENTINEL
    }
}

/// An incoming submission before a row identifier is assigned.
///
/// # Invariants
/// - Field keys follow the camelCase ingestion wire shape.
/// - `validate` must pass before the request reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmissionRequest {
    /// Player display name.
    pub name: String,
    /// Reached game level.
    pub level: i64,
    /// Serialized JSON text mapping function name to usage count.
    pub function_details: String,
    /// Total distinct functions reported by the client.
    pub total_functions: i64,
    /// Completion time in milliseconds.
    pub completion_time_ms: i64,
    /// Completion time in `HH:MM:SS` display form.
    pub completion_time_formatted: String,
    /// Client-supplied composite display timestamp.
    pub timestamp: String,
}

/// Submission validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling and audit labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is empty after trimming.
    #[error("name must not be empty")]
    EmptyName,
    /// Level is negative.
    #[error("level must not be negative: {0}")]
    NegativeLevel(i64),
    /// Total function count is negative.
    #[error("total functions must not be negative: {0}")]
    NegativeTotalFunctions(i64),
    /// Completion time milliseconds is negative.
    #[error("completion time must not be negative: {0}")]
    NegativeCompletionTime(i64),
    /// Formatted completion time is not `HH:MM:SS` shaped.
    #[error("completion time display must be HH:MM:SS: {0}")]
    MalformedCompletionTime(String),
}

impl SubmissionRequest {
    /// Validates the submission shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for the first violated constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.level < 0 {
            return Err(ValidationError::NegativeLevel(self.level));
        }
        if self.total_functions < 0 {
            return Err(ValidationError::NegativeTotalFunctions(self.total_functions));
        }
        if self.completion_time_ms < 0 {
            return Err(ValidationError::NegativeCompletionTime(self.completion_time_ms));
        }
        if !is_clock_display(&self.completion_time_formatted) {
            return Err(ValidationError::MalformedCompletionTime(
                self.completion_time_formatted.clone(),
            ));
        }
        Ok(())
    }

    /// Builds the stored record with a store-assigned identifier.
    #[must_use]
    pub fn into_record(self, id: i64) -> GameProgressRecord {
        GameProgressRecord {
            id,
            name: self.name,
            level: self.level,
            function_details: self.function_details,
            total_functions: self.total_functions,
            completion_time_ms: self.completion_time_ms,
            completion_time_formatted: self.completion_time_formatted,
            timestamp: self.timestamp,
        }
    }
}

/// Checks that a display value is `HH:MM:SS` shaped with in-range fields.
fn is_clock_display(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    let digit_pair = |hi: u8, lo: u8| -> Option<u8> {
        if hi.is_ascii_digit() && lo.is_ascii_digit() {
            Some((hi - b'0') * 10 + (lo - b'0'))
        } else {
            None
        }
    };
    let Some(_hours) = digit_pair(bytes[0], bytes[1]) else {
        return false;
    };
    let Some(minutes) = digit_pair(bytes[3], bytes[4]) else {
        return false;
    };
    let Some(seconds) = digit_pair(bytes[6], bytes[7]) else {
        return false;
    };
    minutes < 60 && seconds < 60
}
