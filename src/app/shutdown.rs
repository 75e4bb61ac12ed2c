//! Graceful shutdown handling.

use std::time::Duration;

use log::info;
use tokio_util::sync::CancellationToken;

use crate::app::logging::{log_rates, Reporter};
use crate::error_handling::{RateSnapshot, RequestCounters};
use crate::run::WorkerPool;

/// Why the run is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every request in the budget completed
    BudgetExhausted,
    /// External interruption (Ctrl-C or a caller's token)
    Interrupted,
}

/// Totals gathered while shutting down.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShutdownTotals {
    /// Sum of every reporter snapshot plus the final one
    pub reported: RateSnapshot,
    /// Requests issued by workers that exited within the drain timeout
    pub issued: u64,
}

/// Stops the workers and the reporter and emits the final snapshot.
///
/// When the budget is exhausted every outcome is already recorded, so the final
/// snapshot is taken first and the (idle) workers are released afterwards. On
/// interruption the workers are drained first so their in-flight requests make
/// it into the final snapshot.
pub async fn shutdown_gracefully(
    reason: StopReason,
    cancel_workers: &CancellationToken,
    workers: WorkerPool,
    reporter: Reporter,
    counters: &RequestCounters,
    drain_timeout: Duration,
) -> ShutdownTotals {
    match reason {
        StopReason::BudgetExhausted => {
            let reported = finish_reporting(reporter, counters).await;
            cancel_workers.cancel();
            let issued = workers.join(drain_timeout).await;
            ShutdownTotals { reported, issued }
        }
        StopReason::Interrupted => {
            info!(
                "Stopping {} worker(s), waiting up to {}s for in-flight requests",
                workers.len(),
                drain_timeout.as_secs()
            );
            cancel_workers.cancel();
            let issued = workers.join(drain_timeout).await;
            let reported = finish_reporting(reporter, counters).await;
            ShutdownTotals { reported, issued }
        }
    }
}

async fn finish_reporting(reporter: Reporter, counters: &RequestCounters) -> RateSnapshot {
    let reported = reporter.stop().await;
    let last = counters.snapshot_and_reset();
    log_rates(last);
    reported + last
}
