// crates/scoreboard-core/tests/limiter.rs
// ============================================================================
// Module: Rate Limiter Tests
// Description: Sliding-window admission tests with an injected clock.
// Purpose: Ensure window pruning and retry hints follow the contract.
// Dependencies: scoreboard-core
// ============================================================================
//! ## Overview
//! Validates window admission, retry-hint arithmetic, and per-key isolation.
//! All tests supply explicit unix-millisecond clocks.

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

use std::sync::Arc;

use scoreboard_core::LimiterConfig;
use scoreboard_core::NoopAuditSink;
use scoreboard_core::SlidingWindowLimiter;

fn limiter() -> SlidingWindowLimiter {
    SlidingWindowLimiter::new(LimiterConfig::default(), Arc::new(NoopAuditSink))
}

// ============================================================================
// SECTION: Window Admission
// ============================================================================

/// Verifies a second request five seconds later is rejected with a hint.
#[test]
fn second_request_inside_window_is_rejected() {
    let limiter = limiter();
    let first = limiter.admit("10.0.0.1", 1_000_000);
    assert!(first.allowed);

    let second = limiter.admit("10.0.0.1", 1_005_000);
    assert!(!second.allowed);
    assert_eq!(second.retry_after_seconds, Some(15));
}

/// Verifies a request after the window has elapsed is admitted.
#[test]
fn request_after_window_is_admitted() {
    let limiter = limiter();
    assert!(limiter.admit("10.0.0.1", 1_000_000).allowed);
    assert!(limiter.admit("10.0.0.1", 1_021_000).allowed);
}

/// Verifies the retry hint rounds partial seconds up.
#[test]
fn retry_hint_rounds_up() {
    let limiter = limiter();
    assert!(limiter.admit("10.0.0.1", 1_000_000).allowed);

    let rejected = limiter.admit("10.0.0.1", 1_019_500);
    assert!(!rejected.allowed);
    assert_eq!(rejected.retry_after_seconds, Some(1));
}

/// Verifies the window is open again exactly one window after admission.
#[test]
fn boundary_request_is_admitted() {
    let limiter = limiter();
    assert!(limiter.admit("10.0.0.1", 1_000_000).allowed);
    assert!(limiter.admit("10.0.0.1", 1_020_000).allowed);
}

// ============================================================================
// SECTION: Key Isolation
// ============================================================================

/// Verifies distinct source keys do not share a window.
#[test]
fn distinct_sources_are_independent() {
    let limiter = limiter();
    assert!(limiter.admit("10.0.0.1", 1_000_000).allowed);
    assert!(limiter.admit("10.0.0.2", 1_000_000).allowed);
    assert!(!limiter.admit("10.0.0.1", 1_001_000).allowed);
    assert!(!limiter.admit("10.0.0.2", 1_001_000).allowed);
}

/// Verifies rejected requests do not extend the window.
#[test]
fn rejections_do_not_extend_window() {
    let limiter = limiter();
    assert!(limiter.admit("10.0.0.1", 1_000_000).allowed);
    assert!(!limiter.admit("10.0.0.1", 1_010_000).allowed);
    assert!(limiter.admit("10.0.0.1", 1_020_001).allowed);
}

// ============================================================================
// SECTION: Quota Above One
// ============================================================================

/// Verifies larger quotas admit up to the configured count per window.
#[test]
fn quota_of_three_admits_three_per_window() {
    let config = LimiterConfig {
        max_requests: 3,
        window_ms: 20_000,
    };
    let limiter = SlidingWindowLimiter::new(config, Arc::new(NoopAuditSink));
    assert!(limiter.admit("k", 0).allowed);
    assert!(limiter.admit("k", 1_000).allowed);
    assert!(limiter.admit("k", 2_000).allowed);
    assert!(!limiter.admit("k", 3_000).allowed);
    assert!(limiter.admit("k", 20_001).allowed);
}
