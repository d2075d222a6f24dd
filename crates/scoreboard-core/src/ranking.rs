// crates/scoreboard-core/src/ranking.rs
// ============================================================================
// Module: Scoreboard Ranking
// Description: Deterministic leaderboard ordering over progress records.
// Purpose: Provide the single comparator the read path and views must agree on.
// Dependencies: crate::record
// ============================================================================

//! ## Overview
//! Ranking is a total order: records carrying the no-valid-time sentinel sort
//! strictly after every timed record, timed records sort by ascending
//! completion milliseconds, and ties break by ascending row identifier. The
//! persisted ranked view must reproduce this order exactly; every read
//! re-derives the order with no caching.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use crate::record::GameProgressRecord;

// ============================================================================
// SECTION: Comparator
// ============================================================================

/// Compares two records in leaderboard order.
#[must_use]
pub fn compare_records(a: &GameProgressRecord, b: &GameProgressRecord) -> Ordering {
    match (a.is_unfinished(), b.is_unfinished()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a
            .completion_time_ms
            .cmp(&b.completion_time_ms)
            .then_with(|| a.id.cmp(&b.id)),
    }
}

/// Sorts records in place into leaderboard order.
pub fn sort_records(records: &mut [GameProgressRecord]) {
    records.sort_by(compare_records);
}
