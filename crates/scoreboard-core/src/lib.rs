// crates/scoreboard-core/src/lib.rs
// ============================================================================
// Module: Scoreboard Core Library
// Description: Public API surface for the Scoreboard core.
// Purpose: Expose domain records, ranking, admission control, and interfaces.
// Dependencies: crate::{audit, clock, gate, interfaces, limiter, ranking, record}
// ============================================================================

//! ## Overview
//! Scoreboard core provides the domain model for game-progress telemetry:
//! submission records and validation, deterministic ranking, submission
//! locking, sliding-window rate limiting, and the backend-agnostic store and
//! audit interfaces. It is storage-agnostic and integrates through explicit
//! interfaces rather than embedding into a particular backend.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod clock;
pub mod gate;
pub mod interfaces;
pub mod limiter;
pub mod ranking;
pub mod record;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AdminAuditEvent;
pub use audit::AuditSink;
pub use audit::BackupAuditEvent;
pub use audit::LimiterAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::SubmissionAuditEvent;
pub use clock::display_timestamp;
pub use clock::extract_time_of_day;
pub use clock::format_completion_time;
pub use gate::SubmissionGate;
pub use interfaces::LogicalTable;
pub use interfaces::ProgressStore;
pub use interfaces::StoreError;
pub use limiter::Admission;
pub use limiter::LimiterConfig;
pub use limiter::SlidingWindowLimiter;
pub use ranking::compare_records;
pub use ranking::sort_records;
pub use record::GameProgressRecord;
pub use record::SubmissionRequest;
pub use record::ValidationError;
pub use record::NO_TIME_SENTINEL;
