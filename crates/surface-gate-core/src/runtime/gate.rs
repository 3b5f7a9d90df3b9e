// crates/surface-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Surface Gate Admission Gate
// Description: Rate/size admission control for live update batches.
// Purpose: Protect the live session path from flooding and oversized payloads.
// Dependencies: crate::core::identifiers, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The admission gate guards a batch of update messages before they reach the
//! live session engine. It enforces a batch-length cap, a serialized-size
//! cap, and a sliding-window rate limit with escalating penalties: a
//! transient burst fails soft (`rate_limited`) while sustained abuse fails
//! hard (`rate_limit_exceeded`). The violation counter only escalates on
//! consecutive violations; any successful admission, empty batches included,
//! resets it to zero.
//!
//! The gate never reads wall-clock time itself; callers supply unix
//! milliseconds on every admission, which keeps the window deterministic
//! under test. Windows are keyed by session and pruned on every call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::SessionKey;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Admission limits for live update batches.
///
/// # Invariants
/// - All limits are fixed at gate construction; per-call overrides are not
///   supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateLimits {
    /// Maximum number of updates in one batch.
    pub max_batch_len: usize,
    /// Maximum serialized batch size in bytes.
    pub max_batch_bytes: usize,
    /// Maximum updates admitted per sliding window.
    pub max_updates_per_sec: usize,
    /// Sliding window duration in milliseconds.
    pub window_ms: i64,
    /// Consecutive violations before the gate fails hard.
    pub max_rate_violations: u32,
}

impl Default for GateLimits {
    fn default() -> Self {
        Self {
            max_batch_len: 32,
            max_batch_bytes: 128 * 1024,
            max_updates_per_sec: 20,
            window_ms: 1_000,
            max_rate_violations: 3,
        }
    }
}

// ============================================================================
// SECTION: Admission Errors
// ============================================================================

/// Admission-control errors.
///
/// # Invariants
/// - `RateLimited` is a soft, transient signal; `RateLimitExceeded` is the
///   hard, sustained-abuse signal and warrants a cool-down or session
///   termination by callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The batch is not an array of updates.
    #[error("live updates must be an array")]
    InvalidUpdates,
    /// The batch exceeds the configured length cap.
    #[error("live update batch too large: {actual} > {max}")]
    BatchTooLarge {
        /// Configured maximum batch length.
        max: usize,
        /// Actual batch length.
        actual: usize,
    },
    /// The serialized batch exceeds the configured byte cap.
    #[error("live update payload too large: {actual} > {max}")]
    PayloadTooLarge {
        /// Configured maximum payload bytes.
        max: usize,
        /// Actual payload bytes.
        actual: usize,
    },
    /// Transient rate violation; callers should back off.
    #[error("rate limited")]
    RateLimited,
    /// Sustained rate abuse; callers should cool down or terminate.
    #[error("rate limit exceeded")]
    RateLimitExceeded,
}

impl AdmissionError {
    /// Returns the stable snake_case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidUpdates => "invalid_updates",
            Self::BatchTooLarge {
                ..
            } => "live_update_batch_too_large",
            Self::PayloadTooLarge {
                ..
            } => "live_update_payload_too_large",
            Self::RateLimited => "rate_limited",
            Self::RateLimitExceeded => "rate_limit_exceeded",
        }
    }
}

// ============================================================================
// SECTION: Rate Window State
// ============================================================================

/// Sliding-window admission state for one session key.
///
/// # Invariants
/// - `admitted` holds only timestamps within the current window after pruning.
/// - `violations` counts consecutive window violations only.
#[derive(Debug, Default)]
struct RateWindowState {
    /// Admission timestamps in unix milliseconds, oldest first.
    admitted: VecDeque<i64>,
    /// Consecutive violation count.
    violations: u32,
}

// ============================================================================
// SECTION: Admission Gate
// ============================================================================

/// Rate/size admission gate for live update batches.
///
/// # Invariants
/// - Window state is owned exclusively by this gate and keyed per session.
/// - The registry lock guards map lookup and insert only; window mutation
///   happens under the per-key lock, so unrelated sessions admit in parallel.
#[derive(Debug, Default)]
pub struct AdmissionGate {
    /// Configured limits.
    limits: GateLimits,
    /// Per-session window state behind per-key locks.
    windows: Mutex<HashMap<SessionKey, Arc<Mutex<RateWindowState>>>>,
}

impl AdmissionGate {
    /// Creates a gate with the given limits.
    #[must_use]
    pub fn new(limits: GateLimits) -> Self {
        Self {
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> &GateLimits {
        &self.limits
    }

    /// Admits or rejects a batch at the supplied timestamp.
    ///
    /// An empty batch is trivially admitted without recording timestamps,
    /// but like every successful admission it resets the violation counter.
    /// One timestamp per update is recorded before the window check, so
    /// rejected batches still count toward the window.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError`] when the batch fails a structural, size, or
    /// rate check.
    pub fn admit_at(
        &self,
        key: &SessionKey,
        batch: &Value,
        now_ms: i64,
    ) -> Result<(), AdmissionError> {
        let Some(updates) = batch.as_array() else {
            return Err(AdmissionError::InvalidUpdates);
        };
        if updates.is_empty() {
            if let Some(entry) = self.lookup(key) {
                lock_unpoisoned(&entry).violations = 0;
            }
            return Ok(());
        }
        if updates.len() > self.limits.max_batch_len {
            return Err(AdmissionError::BatchTooLarge {
                max: self.limits.max_batch_len,
                actual: updates.len(),
            });
        }
        // A serialization failure leaves the size unknown; the size check is
        // skipped rather than failing closed or open arbitrarily.
        if let Ok(bytes) = serde_json::to_vec(batch)
            && bytes.len() > self.limits.max_batch_bytes
        {
            return Err(AdmissionError::PayloadTooLarge {
                max: self.limits.max_batch_bytes,
                actual: bytes.len(),
            });
        }

        let entry = self.window_or_insert(key);
        let mut window = lock_unpoisoned(&entry);
        for _ in 0..updates.len() {
            window.admitted.push_back(now_ms);
        }
        let horizon = now_ms.saturating_sub(self.limits.window_ms);
        while window.admitted.front().is_some_and(|stamp| *stamp < horizon) {
            window.admitted.pop_front();
        }

        if window.admitted.len() > self.limits.max_updates_per_sec {
            window.violations = window.violations.saturating_add(1);
            if window.violations >= self.limits.max_rate_violations {
                return Err(AdmissionError::RateLimitExceeded);
            }
            return Err(AdmissionError::RateLimited);
        }
        window.violations = 0;
        Ok(())
    }

    /// Admits or rejects a batch at the current system time.
    ///
    /// Convenience wrapper over [`Self::admit_at`] for hosts without their
    /// own clock plumbing; tests use the timestamped entry point directly.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError`] when the batch fails a structural, size, or
    /// rate check.
    pub fn admit(&self, key: &SessionKey, batch: &Value) -> Result<(), AdmissionError> {
        self.admit_at(key, batch, unix_now_ms())
    }

    /// Drops all window state for a session key.
    ///
    /// Used when a session is terminated so a fresh session starts with a
    /// clean window.
    pub fn forget(&self, key: &SessionKey) {
        lock_unpoisoned(&self.windows).remove(key);
    }

    /// Looks up an existing window entry without creating one.
    fn lookup(&self, key: &SessionKey) -> Option<Arc<Mutex<RateWindowState>>> {
        lock_unpoisoned(&self.windows).get(key).cloned()
    }

    /// Returns the existing window entry for the key or inserts a fresh one.
    fn window_or_insert(&self, key: &SessionKey) -> Arc<Mutex<RateWindowState>> {
        let mut windows = lock_unpoisoned(&self.windows);
        Arc::clone(windows.entry(key.clone()).or_default())
    }
}

// ============================================================================
// SECTION: Clock Helpers
// ============================================================================

/// Returns the current unix time in milliseconds.
///
/// A pre-epoch or overflowing clock maps to zero, which admits; the gate
/// treats an unusable clock as an empty window rather than rejecting traffic.
fn unix_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(0)
}

// ============================================================================
// SECTION: Lock Helpers
// ============================================================================

/// Locks a mutex, recovering the guard from a poisoned lock.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
