//! Request outcome tracking.
//!
//! This module provides the lock-free counters shared by every worker:
//! - [`RequestCounters`]: per-interval success/failure counts, drained by the reporter
//! - [`FailureStats`]: cumulative per-category failure counts for the end-of-run breakdown

use std::collections::HashMap;
use std::ops::{Add, AddAssign};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FailureKind;

/// Pair of counts taken by a single snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateSnapshot {
    /// Requests that completed with a 2xx status
    pub succeeded: u64,
    /// Requests that completed with any other outcome
    pub failed: u64,
}

impl RateSnapshot {
    /// Succeeded plus failed.
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

impl Add for RateSnapshot {
    type Output = RateSnapshot;

    fn add(self, rhs: RateSnapshot) -> RateSnapshot {
        RateSnapshot {
            succeeded: self.succeeded + rhs.succeeded,
            failed: self.failed + rhs.failed,
        }
    }
}

impl AddAssign for RateSnapshot {
    fn add_assign(&mut self, rhs: RateSnapshot) {
        *self = *self + rhs;
    }
}

/// Success and failure counters for the current reporting interval.
///
/// Workers increment with `fetch_add`; the reporter drains with `swap(0)`. Each
/// increment therefore lands in exactly one snapshot: either before the swap
/// (and is returned by it) or after (and is returned by the next one).
#[derive(Debug, Default)]
pub struct RequestCounters {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl RequestCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one 2xx response.
    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::AcqRel);
    }

    /// Counts one failed request.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns the counts accumulated since the previous call and resets both to zero.
    pub fn snapshot_and_reset(&self) -> RateSnapshot {
        RateSnapshot {
            succeeded: self.succeeded.swap(0, Ordering::AcqRel),
            failed: self.failed.swap(0, Ordering::AcqRel),
        }
    }
}

/// Thread-safe cumulative failure breakdown.
///
/// All categories are initialized to zero on creation so increments never
/// need to allocate or lock.
pub struct FailureStats {
    failures: HashMap<FailureKind, AtomicUsize>,
}

impl FailureStats {
    /// Creates the breakdown with every category at zero.
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }
        FailureStats { failures }
    }

    /// Counts one failure of `kind`.
    pub fn increment(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map",
                kind
            );
        }
    }

    /// Failures recorded for `kind`.
    pub fn get(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Failures recorded across all categories.
    pub fn total(&self) -> usize {
        self.failures
            .values()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }
}

impl Default for FailureStats {
    fn default() -> Self {
        Self::new()
    }
}
