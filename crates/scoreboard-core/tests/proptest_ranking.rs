// crates/scoreboard-core/tests/proptest_ranking.rs
// ============================================================================
// Module: Ranking Property-Based Tests
// Description: Property tests for leaderboard ordering invariants.
// Purpose: Detect ordering violations across wide input ranges.
// ============================================================================

//! Property-based tests for ranking invariants.

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

use proptest::prelude::*;
use scoreboard_core::GameProgressRecord;
use scoreboard_core::compare_records;
use scoreboard_core::sort_records;

fn record(id: i64, millis: i64, unfinished: bool) -> GameProgressRecord {
    GameProgressRecord {
        id,
        name: format!("player-{id}"),
        level: 1,
        function_details: "{}".to_string(),
        total_functions: 0,
        completion_time_ms: millis,
        completion_time_formatted: if unfinished {
            "00:00:00".to_string()
        } else {
            "00:00:01".to_string()
        },
        timestamp: "05/08/2026, 12:00:00".to_string(),
    }
}

fn record_strategy() -> impl Strategy<Value = GameProgressRecord> {
    (any::<i64>(), 0_i64 .. 10_000_000, any::<bool>())
        .prop_map(|(id, millis, unfinished)| record(id, millis, unfinished))
}

proptest! {
    #[test]
    fn comparator_is_antisymmetric(a in record_strategy(), b in record_strategy()) {
        let forward = compare_records(&a, &b);
        let backward = compare_records(&b, &a);
        prop_assert_eq!(forward, backward.reverse());
    }

    #[test]
    fn comparator_is_total_on_distinct_ids(a in record_strategy(), b in record_strategy()) {
        if a.id != b.id {
            prop_assert_ne!(compare_records(&a, &b), Ordering::Equal);
        }
    }

    #[test]
    fn sorted_population_keeps_unfinished_last(
        mut records in prop::collection::vec(record_strategy(), 0 .. 32)
    ) {
        sort_records(&mut records);
        let first_unfinished =
            records.iter().position(GameProgressRecord::is_unfinished).unwrap_or(records.len());
        for row in &records[first_unfinished ..] {
            prop_assert!(row.is_unfinished());
        }
        for pair in records[.. first_unfinished].windows(2) {
            prop_assert!(pair[0].completion_time_ms <= pair[1].completion_time_ms);
        }
    }
}
