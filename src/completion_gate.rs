//! Bounded-run completion tracking.
//!
//! When a request budget is configured, the [`CompletionGate`] makes sure that
//! exactly `budget` requests are issued across all workers and lets the
//! orchestrator wait until every one of them has completed.
//!
//! Two counts are kept:
//! - `unclaimed`: slots not yet handed to a worker. A worker claims a slot before
//!   waiting for a rate-limiter permit and stops once none are left.
//! - `remaining`: claimed-or-unclaimed requests that have not completed yet. The
//!   gate opens when it reaches zero.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;

/// Countdown gate for a fixed request budget.
#[derive(Debug)]
pub struct CompletionGate {
    budget: u64,
    unclaimed: AtomicU64,
    remaining: AtomicU64,
    opened: Notify,
}

impl CompletionGate {
    /// Creates a closed gate for `budget` requests.
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            unclaimed: AtomicU64::new(budget),
            remaining: AtomicU64::new(budget),
            opened: Notify::new(),
        }
    }

    /// The request budget this gate was created with.
    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Reserves one request slot.
    ///
    /// Returns `None` once every slot has been handed out. The returned guard
    /// decrements the gate when dropped, so the slot is counted down whether the
    /// request succeeded, failed, or the worker unwound.
    pub fn try_claim(&self) -> Option<CompletionGuard<'_>> {
        self.unclaimed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|_| CompletionGuard { gate: self })
    }

    /// Whether any slot is still available to claim.
    pub fn has_unclaimed(&self) -> bool {
        self.unclaimed.load(Ordering::Acquire) > 0
    }

    /// Counts one request as completed.
    ///
    /// Never goes below zero; returns `false` if the gate was already open.
    pub fn decrement(&self) -> bool {
        match self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => {
                self.opened.notify_waiters();
                true
            }
            Ok(_) => true,
            Err(_) => {
                log::warn!("Completion gate decremented after reaching zero");
                false
            }
        }
    }

    /// Requests that have not completed yet.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Whether every request in the budget has completed.
    pub fn is_open(&self) -> bool {
        self.remaining() == 0
    }

    /// Waits until every request in the budget has completed.
    pub async fn await_zero(&self) {
        loop {
            let notified = self.opened.notified();
            tokio::pin!(notified);
            // Register before checking so a notification between the check and
            // the await is not missed
            notified.as_mut().enable();
            if self.is_open() {
                return;
            }
            notified.await;
        }
    }
}

/// A claimed request slot. Dropping it counts the request as completed.
#[derive(Debug)]
#[must_use = "dropping the guard immediately counts the request as completed"]
pub struct CompletionGuard<'a> {
    gate: &'a CompletionGate,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.gate.decrement();
    }
}
