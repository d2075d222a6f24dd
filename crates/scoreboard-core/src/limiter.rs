// crates/scoreboard-core/src/limiter.rs
// ============================================================================
// Module: Scoreboard Rate Limiter
// Description: Per-source sliding-window admission control for ingestion.
// Purpose: Bound submission frequency without dropping ingestion availability.
// Dependencies: crate::audit
// ============================================================================

//! ## Overview
//! The limiter keeps one pruned timestamp bucket per source key. A request is
//! admitted when fewer than `max_requests` timestamps remain inside the
//! window; otherwise the caller receives a whole-second retry hint derived
//! from the oldest in-window entry. Time is caller-supplied unix
//! milliseconds, so tests inject their own clock.
//!
//! Internal lock failures fail open: ingestion availability wins over strict
//! limiting, and the fail-open is reported through the audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::audit::AuditSink;
use crate::audit::LimiterAuditEvent;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Sliding-window limiter settings.
///
/// # Invariants
/// - `max_requests >= 1` and `window_ms >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    /// Maximum admitted requests per window.
    pub max_requests: usize,
    /// Window length in milliseconds.
    pub window_ms: i64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 1,
            window_ms: 20_000,
        }
    }
}

/// Admission decision for one request.
///
/// # Invariants
/// - `retry_after_seconds` is present exactly when the request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request is admitted.
    pub allowed: bool,
    /// Whole-second retry hint when rejected.
    pub retry_after_seconds: Option<u64>,
}

// ============================================================================
// SECTION: Limiter
// ============================================================================

/// Per-source sliding-window rate limiter.
///
/// # Invariants
/// - Bucket state is process-lifetime only and pruned on access.
pub struct SlidingWindowLimiter {
    /// Limiter settings.
    config: LimiterConfig,
    /// Audit sink for fail-open reporting.
    sink: Arc<dyn AuditSink>,
    /// Per-source request timestamps (unix milliseconds).
    buckets: Mutex<HashMap<String, Vec<i64>>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter with the given settings and audit sink.
    #[must_use]
    pub fn new(config: LimiterConfig, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            config,
            sink,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Decides admission for a request from `source_key` at `now_ms`.
    #[must_use]
    pub fn admit(&self, source_key: &str, now_ms: i64) -> Admission {
        let Ok(mut buckets) = self.buckets.lock() else {
            self.sink.record_limiter(&LimiterAuditEvent::new(source_key, "fail_open"));
            return Admission {
                allowed: true,
                retry_after_seconds: None,
            };
        };
        let window_floor = now_ms - self.config.window_ms;
        let bucket = buckets.entry(source_key.to_string()).or_default();
        bucket.retain(|&stamp| stamp > window_floor);

        if bucket.len() >= self.config.max_requests {
            let oldest = bucket.iter().copied().min().unwrap_or(now_ms);
            let wait_ms = (oldest + self.config.window_ms - now_ms).max(0);
            let retry_after_seconds = u64::try_from(wait_ms).map_or(0, |w| w.div_ceil(1000));
            return Admission {
                allowed: false,
                retry_after_seconds: Some(retry_after_seconds),
            };
        }

        bucket.push(now_ms);
        Admission {
            allowed: true,
            retry_after_seconds: None,
        }
    }
}
