// crates/scoreboard-core/src/audit.rs
// ============================================================================
// Module: Scoreboard Audit Logging
// Description: Structured audit events for ingestion and maintenance actions.
// Purpose: Emit JSON-line audit logs without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for submission,
//! maintenance, backup, and rate-limiter outcomes. It is intentionally
//! lightweight so deployments can route events to their preferred logging
//! pipeline without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Milliseconds since the unix epoch for event stamping.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Submission ingestion audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Player display name from the submission.
    pub name: String,
    /// Outcome label (`accepted` or a rejection reason).
    pub outcome: &'static str,
    /// Request source key when available.
    pub source: Option<String>,
    /// Time-of-day component of the submission timestamp when present.
    pub time_of_day: Option<String>,
}

impl SubmissionAuditEvent {
    /// Creates an accepted-submission event.
    #[must_use]
    pub fn accepted(name: &str, source: Option<&str>, time_of_day: Option<&str>) -> Self {
        Self {
            event: "submission",
            timestamp_ms: now_millis(),
            name: name.to_string(),
            outcome: "accepted",
            source: source.map(str::to_string),
            time_of_day: time_of_day.map(str::to_string),
        }
    }

    /// Creates a rejected-submission event with a reason label.
    #[must_use]
    pub fn rejected(name: &str, source: Option<&str>, reason: &'static str) -> Self {
        Self {
            event: "submission",
            timestamp_ms: now_millis(),
            name: name.to_string(),
            outcome: reason,
            source: source.map(str::to_string),
            time_of_day: None,
        }
    }
}

/// Maintenance action audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AdminAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Action label.
    pub action: &'static str,
    /// Outcome label.
    pub outcome: &'static str,
    /// Optional action detail.
    pub detail: Option<String>,
}

impl AdminAuditEvent {
    /// Creates a maintenance action event.
    #[must_use]
    pub fn new(action: &'static str, outcome: &'static str, detail: Option<String>) -> Self {
        Self {
            event: "admin_action",
            timestamp_ms: now_millis(),
            action,
            outcome,
            detail,
        }
    }
}

/// Backup lifecycle audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct BackupAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Outcome label.
    pub outcome: &'static str,
    /// Optional failure detail.
    pub detail: Option<String>,
}

impl BackupAuditEvent {
    /// Creates a backup lifecycle event.
    #[must_use]
    pub fn new(outcome: &'static str, detail: Option<String>) -> Self {
        Self {
            event: "backup",
            timestamp_ms: now_millis(),
            outcome,
            detail,
        }
    }
}

/// Rate limiter audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LimiterAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Source key the limiter was consulted for.
    pub source_key: String,
    /// Outcome label.
    pub outcome: &'static str,
}

impl LimiterAuditEvent {
    /// Creates a rate limiter event.
    #[must_use]
    pub fn new(source_key: &str, outcome: &'static str) -> Self {
        Self {
            event: "rate_limiter",
            timestamp_ms: now_millis(),
            source_key: source_key.to_string(),
            outcome,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for service events.
pub trait AuditSink: Send + Sync {
    /// Records a submission outcome.
    fn record_submission(&self, event: &SubmissionAuditEvent);

    /// Records a maintenance action outcome.
    fn record_admin(&self, _event: &AdminAuditEvent) {}

    /// Records a backup lifecycle outcome.
    fn record_backup(&self, _event: &BackupAuditEvent) {}

    /// Records a rate limiter outcome.
    fn record_limiter(&self, _event: &LimiterAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_submission(&self, event: &SubmissionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_admin(&self, event: &AdminAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_backup(&self, event: &BackupAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_limiter(&self, event: &LimiterAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_submission(&self, _event: &SubmissionAuditEvent) {}

    fn record_admin(&self, _event: &AdminAuditEvent) {}

    fn record_backup(&self, _event: &BackupAuditEvent) {}

    fn record_limiter(&self, _event: &LimiterAuditEvent) {}
}
