// crates/scoreboard-core/src/clock.rs
// ============================================================================
// Module: Scoreboard Time Display
// Description: Pure helpers for completion-time and timestamp display forms.
// Purpose: Keep display formatting in one place so producers and views agree.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Display formatting is pure and caller-supplied: these helpers never read
//! wall-clock time. `format_completion_time` renders milliseconds as
//! `HH:MM:SS` and saturates at `99:59:59`; zero renders the no-valid-time
//! sentinel. `extract_time_of_day` slices the time component out of the
//! composite `DD/MM/YYYY, HH:MM:SS` display timestamp.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

// ============================================================================
// SECTION: Completion Time
// ============================================================================

/// Maximum renderable completion time before the display saturates.
const MAX_DISPLAY_SECONDS: i64 = 99 * 3600 + 59 * 60 + 59;

/// Formats completion milliseconds as `HH:MM:SS`, saturating at `99:59:59`.
///
/// Zero and negative inputs render the no-valid-time sentinel `00:00:00`.
#[must_use]
pub fn format_completion_time(millis: i64) -> String {
    let total_seconds = (millis / 1000).clamp(0, MAX_DISPLAY_SECONDS);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

// ============================================================================
// SECTION: Composite Timestamps
// ============================================================================

/// Returns the time-of-day component of a composite display timestamp.
///
/// The composite form is `DD/MM/YYYY, HH:MM:SS`; inputs without the `", "`
/// separator yield `None`.
#[must_use]
pub fn extract_time_of_day(display: &str) -> Option<&str> {
    let (_date, time) = display.split_once(", ")?;
    if time.is_empty() { None } else { Some(time) }
}

/// Renders an instant as the composite `DD/MM/YYYY, HH:MM:SS` display form.
#[must_use]
pub fn display_timestamp(instant: OffsetDateTime) -> String {
    format!(
        "{:02}/{:02}/{}, {:02}:{:02}:{:02}",
        instant.day(),
        u8::from(instant.month()),
        instant.year(),
        instant.hour(),
        instant.minute(),
        instant.second()
    )
}
