//! Ranked view property-based tests.
//!
//! ## Purpose
//! These tests fuzz mixed record populations to ensure the persisted ranked
//! view and the in-memory comparator never disagree.
//!
//! ## What is covered
//! - Arbitrary mixes of timed and no-time rows rank identically in SQL and
//!   in memory.
//! - The ranked order is total: every stored row appears exactly once.
//!
//! ## What is intentionally out of scope
//! - Name uniqueness conflicts (covered by `sqlite_store_unit.rs`).
// crates/scoreboard-store-sqlite/tests/proptest_ranked_view.rs
// ============================================================================
// Module: Ranked View Property-Based Tests
// Description: Fuzz-like agreement checks for the leaderboard ordering.
// Purpose: Ensure SQL view ordering matches the in-memory comparator.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use scoreboard_core::NO_TIME_SENTINEL;
use scoreboard_core::ProgressStore;
use scoreboard_core::SubmissionRequest;
use scoreboard_core::format_completion_time;
use scoreboard_core::sort_records;
use scoreboard_store_sqlite::SqliteProgressStore;
use scoreboard_store_sqlite::SqliteStoreConfig;
use scoreboard_store_sqlite::SqliteStoreMode;
use scoreboard_store_sqlite::SqliteSyncMode;
use tempfile::tempdir;

fn open_store(path: std::path::PathBuf) -> SqliteProgressStore {
    SqliteProgressStore::new(SqliteStoreConfig {
        path,
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Normal,
        protected_tables: Vec::new(),
    })
    .expect("store should open")
}

proptest! {
    #[test]
    fn ranked_view_agrees_with_comparator(
        rows in proptest::collection::vec((1_000_i64..7_200_000, any::<bool>()), 1..24)
    ) {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path().join("ranked.db"));
        for (index, (completion_time_ms, unfinished)) in rows.iter().enumerate() {
            let completion_time_formatted = if *unfinished {
                NO_TIME_SENTINEL.to_string()
            } else {
                format_completion_time(*completion_time_ms)
            };
            let request = SubmissionRequest {
                name: format!("player-{index}"),
                level: 1,
                function_details: "{}".to_string(),
                total_functions: 0,
                completion_time_ms: *completion_time_ms,
                completion_time_formatted,
                timestamp: "01/08/2026, 00:00:00".to_string(),
            };
            store.insert(&request).unwrap();
        }

        let ranked = store.list_ranked().unwrap();
        prop_assert_eq!(ranked.len(), rows.len());
        let mut expected = ranked.clone();
        sort_records(&mut expected);
        prop_assert_eq!(ranked, expected);
    }
}
