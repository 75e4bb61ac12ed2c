//! Periodic rate reporting.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{RateSnapshot, RequestCounters};

/// Logs one interval's counts.
pub fn log_rates(snapshot: RateSnapshot) {
    info!("Succeeded: {} req/sec", snapshot.succeeded);
    info!("   Failed: {} req/sec", snapshot.failed);
}

/// Handle to the background reporter task.
pub struct Reporter {
    cancel: CancellationToken,
    handle: JoinHandle<RateSnapshot>,
}

impl Reporter {
    /// Starts a reporter that drains `counters` every `period`.
    ///
    /// The first tick fires one period after spawning. Ticks follow a fixed
    /// schedule; a tick delayed past the next deadline is skipped rather than
    /// replayed in a burst.
    pub fn spawn(counters: Arc<RequestCounters>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let cancel_reporting = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut reported = RateSnapshot::default();
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = counters.snapshot_and_reset();
                        log_rates(snapshot);
                        reported += snapshot;
                    }
                    _ = cancel_reporting.cancelled() => {
                        break;
                    }
                }
            }
            reported
        });

        Self { cancel, handle }
    }

    /// Stops the reporter and returns the sum of every snapshot it logged.
    pub async fn stop(self) -> RateSnapshot {
        self.cancel.cancel();
        match self.handle.await {
            Ok(reported) => reported,
            Err(join_error) => {
                warn!("Reporter task failed: {:?}", join_error);
                RateSnapshot::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reporter_drains_counters_each_tick() {
        let counters = Arc::new(RequestCounters::new());
        let reporter = Reporter::spawn(Arc::clone(&counters), Duration::from_millis(50));

        counters.record_success();
        counters.record_failure();
        tokio::time::sleep(Duration::from_millis(120)).await;
        counters.record_success();

        tokio::time::sleep(Duration::from_millis(60)).await;
        let reported = reporter.stop().await;
        let leftover = counters.snapshot_and_reset();

        assert_eq!(reported + leftover, RateSnapshot { succeeded: 2, failed: 1 });
        assert_eq!(reported.succeeded, 2, "Both successes predate the last tick");
    }

    #[tokio::test]
    async fn test_reporter_first_tick_after_one_period() {
        let counters = Arc::new(RequestCounters::new());
        let reporter = Reporter::spawn(Arc::clone(&counters), Duration::from_millis(200));
        counters.record_success();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let reported = reporter.stop().await;

        assert_eq!(reported, RateSnapshot::default(), "No tick before one period");
        assert_eq!(counters.snapshot_and_reset().succeeded, 1);
    }

    #[tokio::test]
    async fn test_reporter_stops_promptly() {
        let counters = Arc::new(RequestCounters::new());
        let reporter = Reporter::spawn(counters, Duration::from_secs(60));
        let stopped = tokio::time::timeout(Duration::from_secs(1), reporter.stop()).await;
        assert!(stopped.is_ok());
    }
}
