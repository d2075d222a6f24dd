// crates/scoreboard-core/tests/submission_gate.rs
// ============================================================================
// Module: Submission Gate Tests
// Description: Lock-state transition tests for the submission gate.
// Purpose: Ensure the gate reports and swaps state correctly.
// Dependencies: scoreboard-core
// ============================================================================
//! ## Overview
//! Validates default state and previous-state reporting on transitions.

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

use scoreboard_core::SubmissionGate;

/// Verifies the gate starts unlocked.
#[test]
fn gate_starts_unlocked() {
    let gate = SubmissionGate::new();
    assert!(!gate.is_locked());
}

/// Verifies transitions return the previous state.
#[test]
fn set_locked_returns_previous_state() {
    let gate = SubmissionGate::new();
    assert!(!gate.set_locked(true));
    assert!(gate.is_locked());
    assert!(gate.set_locked(true));
    assert!(gate.set_locked(false));
    assert!(!gate.is_locked());
}
