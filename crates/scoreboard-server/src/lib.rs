// crates/scoreboard-server/src/lib.rs
// ============================================================================
// Module: Scoreboard Server
// Description: HTTP surface for submission ingestion and maintenance.
// Purpose: Serve the public telemetry API and credentialed admin routes.
// Dependencies: scoreboard-core, scoreboard-config, scoreboard-store-sqlite,
//               axum, tokio
// ============================================================================

//! ## Overview
//! This crate hosts the Scoreboard HTTP service: public submission ingestion
//! with lock and rate-limit admission control, the ranked leaderboard read,
//! and credentialed maintenance routes for rename, clear, synthetic loading,
//! backup scheduling, and restore. Security posture: HTTP inputs are
//! untrusted; see `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod backup;
pub mod error;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backup::BackupScheduler;
pub use backup::BackupSchedulerError;
pub use backup::BackupState;
pub use error::ApiError;
pub use server::ScoreboardServer;
pub use server::ScoreboardServerError;
pub use server::ServerState;
pub use server::build_router;
pub use server::build_state;
