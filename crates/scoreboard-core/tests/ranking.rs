// crates/scoreboard-core/tests/ranking.rs
// ============================================================================
// Module: Ranking Tests
// Description: Leaderboard ordering tests over progress records.
// Purpose: Ensure the comparator yields the documented total order.
// Dependencies: scoreboard-core
// ============================================================================
//! ## Overview
//! Validates sentinel-last ordering, ascending completion time, and the
//! identifier tie-break.

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

use std::cmp::Ordering;

use scoreboard_core::GameProgressRecord;
use scoreboard_core::compare_records;
use scoreboard_core::sort_records;

fn record(id: i64, millis: i64, formatted: &str) -> GameProgressRecord {
    GameProgressRecord {
        id,
        name: format!("player-{id}"),
        level: 1,
        function_details: "{}".to_string(),
        total_functions: 0,
        completion_time_ms: millis,
        completion_time_formatted: formatted.to_string(),
        timestamp: "05/08/2026, 12:00:00".to_string(),
    }
}

// ============================================================================
// SECTION: Comparator
// ============================================================================

/// Verifies timed records order by ascending completion milliseconds.
#[test]
fn faster_time_ranks_first() {
    let fast = record(2, 60_000, "00:01:00");
    let slow = record(1, 120_000, "00:02:00");
    assert_eq!(compare_records(&fast, &slow), Ordering::Less);
    assert_eq!(compare_records(&slow, &fast), Ordering::Greater);
}

/// Verifies sentinel records rank after every timed record.
#[test]
fn sentinel_ranks_last() {
    let unfinished = record(1, 0, "00:00:00");
    let slow = record(2, 86_399_000, "23:59:59");
    assert_eq!(compare_records(&unfinished, &slow), Ordering::Greater);
    assert_eq!(compare_records(&slow, &unfinished), Ordering::Less);
}

/// Verifies equal times break ties by ascending identifier.
#[test]
fn equal_times_tie_break_by_id() {
    let first = record(3, 60_000, "00:01:00");
    let second = record(9, 60_000, "00:01:00");
    assert_eq!(compare_records(&first, &second), Ordering::Less);
}

/// Verifies two sentinel records still order deterministically.
#[test]
fn sentinel_pair_orders_by_id() {
    let first = record(4, 0, "00:00:00");
    let second = record(8, 0, "00:00:00");
    assert_eq!(compare_records(&first, &second), Ordering::Less);
}

// ============================================================================
// SECTION: Sorting
// ============================================================================

/// Verifies a mixed population sorts into the documented order.
#[test]
fn mixed_population_sorts_sentinel_last() {
    let mut records = vec![
        record(1, 0, "00:00:00"),
        record(2, 90_000, "00:01:30"),
        record(3, 30_000, "00:00:30"),
        record(4, 90_000, "00:01:30"),
        record(5, 0, "00:00:00"),
    ];
    sort_records(&mut records);
    let ids: Vec<i64> = records.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![3, 2, 4, 1, 5]);
}
