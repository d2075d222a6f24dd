// crates/scoreboard-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Progress Store
// Description: Durable ProgressStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for Scoreboard telemetry.
// Dependencies: scoreboard-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`scoreboard_core::ProgressStore`]
//! implementation that persists game-progress rows, enforces case-insensitive
//! name uniqueness at the storage layer, and serves the ranked leaderboard
//! view. It also owns the snapshot and restore file lifecycle used by the
//! backup scheduler. Security posture: storage inputs are untrusted; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_SYNTHETIC_ROWS;
pub use store::SqliteProgressStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
