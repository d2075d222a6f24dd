// crates/scoreboard-core/src/gate.rs
// ============================================================================
// Module: Scoreboard Submission Gate
// Description: Process-wide boolean lock over submission ingestion.
// Purpose: Let operators pause ingestion without stopping the service.
// Dependencies: std::sync::atomic
// ============================================================================

//! ## Overview
//! The submission gate is an explicitly owned state object, never a global.
//! It starts unlocked and resets to unlocked on restart; the lock is an
//! in-memory operator control, not a durable setting. Ingestion consults the
//! gate before any rate-limit or storage work.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Boolean gate over submission ingestion.
///
/// # Invariants
/// - Starts unlocked; state is process-lifetime only.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    /// Current lock state.
    locked: AtomicBool,
}

impl SubmissionGate {
    /// Creates an unlocked gate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Returns the current lock state.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    /// Sets the lock state and returns the previous state.
    pub fn set_locked(&self, locked: bool) -> bool {
        self.locked.swap(locked, Ordering::SeqCst)
    }
}
