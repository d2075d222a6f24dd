// crates/scoreboard-core/tests/clock.rs
// ============================================================================
// Module: Time Display Tests
// Description: Completion-time and composite-timestamp formatting tests.
// Purpose: Ensure display helpers stay pure and deterministic.
// Dependencies: scoreboard-core, time
// ============================================================================
//! ## Overview
//! Validates `HH:MM:SS` rendering, saturation, and time-of-day extraction.

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

use scoreboard_core::display_timestamp;
use scoreboard_core::extract_time_of_day;
use scoreboard_core::format_completion_time;
use time::Date;
use time::Month;
use time::Time;

// ============================================================================
// SECTION: Completion Time
// ============================================================================

/// Verifies milliseconds render as `HH:MM:SS`.
#[test]
fn completion_time_renders_clock_display() {
    assert_eq!(format_completion_time(754_000), "00:12:34");
    assert_eq!(format_completion_time(3_600_000), "01:00:00");
    assert_eq!(format_completion_time(86_399_999), "23:59:59");
}

/// Verifies sub-second values truncate to whole seconds.
#[test]
fn completion_time_truncates_to_seconds() {
    assert_eq!(format_completion_time(999), "00:00:00");
    assert_eq!(format_completion_time(1_999), "00:00:01");
}

/// Verifies zero and negative inputs render the sentinel.
#[test]
fn completion_time_sentinel_for_non_positive() {
    assert_eq!(format_completion_time(0), "00:00:00");
    assert_eq!(format_completion_time(-5_000), "00:00:00");
}

/// Verifies display saturation at the two-digit hour ceiling.
#[test]
fn completion_time_saturates_at_display_maximum() {
    assert_eq!(format_completion_time(i64::MAX), "99:59:59");
    assert_eq!(format_completion_time(100 * 3_600_000), "99:59:59");
}

// ============================================================================
// SECTION: Composite Timestamps
// ============================================================================

/// Verifies time-of-day extraction from the composite display form.
#[test]
fn time_of_day_extracts_after_separator() {
    assert_eq!(extract_time_of_day("05/08/2026, 14:03:27"), Some("14:03:27"));
    assert_eq!(extract_time_of_day("05/08/2026, "), None);
    assert_eq!(extract_time_of_day("14:03:27"), None);
    assert_eq!(extract_time_of_day(""), None);
}

/// Verifies composite rendering round-trips through extraction.
#[test]
fn display_timestamp_matches_composite_form() {
    let date = Date::from_calendar_date(2026, Month::August, 5).unwrap();
    let time = Time::from_hms(14, 3, 27).unwrap();
    let instant = date.with_time(time).assume_utc();
    let display = display_timestamp(instant);
    assert_eq!(display, "05/08/2026, 14:03:27");
    assert_eq!(extract_time_of_day(&display), Some("14:03:27"));
}
