//! Worker pool.
//!
//! Each worker owns one [`RequestExecutor`] and loops:
//! stop check → claim a budget slot (bounded runs) → wait for a permit →
//! execute → record the outcome → release the slot.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::completion_gate::CompletionGate;
use crate::error_handling::{FailureStats, RequestCounters};
use crate::fetch::{RequestExecutor, RequestOutcome};
use crate::initialization::RateLimiter;

/// State shared by every worker.
pub struct WorkerContext {
    /// Aggregate request pacing
    pub limiter: Arc<RateLimiter>,
    /// Per-second succeeded/failed counters
    pub counters: Arc<RequestCounters>,
    /// Failure breakdown for the final summary
    pub failure_stats: Arc<FailureStats>,
    /// Request budget, absent for unbounded runs
    pub gate: Option<Arc<CompletionGate>>,
    /// Stop signal for every worker
    pub cancel: CancellationToken,
}

impl WorkerContext {
    fn record(&self, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::Success => self.counters.record_success(),
            RequestOutcome::Failure(kind) => {
                self.counters.record_failure();
                self.failure_stats.increment(kind);
            }
        }
    }
}

/// Runs one worker until it is cancelled or the budget is fully claimed.
///
/// Returns the number of requests this worker issued. Requests are never
/// aborted mid-flight; cancellation is only observed between requests and
/// while waiting for a permit.
pub async fn run_worker<E: RequestExecutor>(id: usize, executor: E, ctx: Arc<WorkerContext>) -> u64 {
    let mut issued = 0u64;
    debug!("Worker {id} started");

    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }

        let slot = match ctx.gate.as_deref() {
            Some(gate) => match gate.try_claim() {
                Some(slot) => Some(slot),
                None => break,
            },
            None => None,
        };

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break,
            _ = ctx.limiter.acquire() => {}
        }

        let outcome = executor.execute().await;
        issued += 1;
        // Counters first: once the gate opens, every outcome must be visible
        ctx.record(outcome);
        drop(slot);
    }

    debug!("Worker {id} stopping after {issued} requests");
    drop(executor);
    issued
}

/// Handles of a running worker pool.
pub struct WorkerPool {
    handles: Vec<JoinHandle<u64>>,
}

impl WorkerPool {
    /// Spawns one worker per executor.
    pub fn spawn<E: RequestExecutor>(executors: Vec<E>, ctx: Arc<WorkerContext>) -> Self {
        let handles = executors
            .into_iter()
            .enumerate()
            .map(|(id, executor)| tokio::spawn(run_worker(id, executor, Arc::clone(&ctx))))
            .collect();
        Self { handles }
    }

    /// Number of workers in the pool.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool has no workers.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits up to `timeout` for every worker to exit.
    ///
    /// Returns the number of requests issued by the workers that finished.
    /// Workers still running at the deadline are aborted; a panicked worker is
    /// logged and otherwise ignored.
    pub async fn join(self, timeout: Duration) -> u64 {
        let deadline = Instant::now() + timeout;
        let mut issued = 0u64;
        let mut unfinished = 0usize;

        for mut handle in self.handles {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(count)) => issued += count,
                Ok(Err(join_error)) => warn!("Worker task panicked: {:?}", join_error),
                Err(_) => {
                    handle.abort();
                    unfinished += 1;
                }
            }
        }

        if unfinished > 0 {
            warn!(
                "{} worker(s) still busy after {}s, abandoning in-flight requests",
                unfinished,
                timeout.as_secs()
            );
        }
        issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{FailureKind, RateSnapshot};
    use crate::initialization::init_rate_limiter;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Executor that alternates outcomes and counts calls.
    struct StubExecutor {
        calls: Arc<AtomicU64>,
        fail_every: u64,
        delay: Duration,
    }

    impl RequestExecutor for StubExecutor {
        async fn execute(&self) -> RequestOutcome {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            if self.fail_every > 0 && n % self.fail_every == 0 {
                RequestOutcome::Failure(FailureKind::ServerErrorStatus)
            } else {
                RequestOutcome::Success
            }
        }
    }

    fn context(qps: u32, budget: Option<u64>) -> Arc<WorkerContext> {
        Arc::new(WorkerContext {
            limiter: init_rate_limiter(qps).unwrap(),
            counters: Arc::new(RequestCounters::new()),
            failure_stats: Arc::new(FailureStats::new()),
            gate: budget.map(|b| Arc::new(CompletionGate::new(b))),
            cancel: CancellationToken::new(),
        })
    }

    fn executors(n: usize, calls: &Arc<AtomicU64>, fail_every: u64) -> Vec<StubExecutor> {
        (0..n)
            .map(|_| StubExecutor {
                calls: Arc::clone(calls),
                fail_every,
                delay: Duration::from_millis(1),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_bounded_pool_issues_exactly_budget() {
        let ctx = context(1_000, Some(25));
        let calls = Arc::new(AtomicU64::new(0));
        let pool = WorkerPool::spawn(executors(4, &calls, 5), Arc::clone(&ctx));
        assert_eq!(pool.len(), 4);

        let gate = ctx.gate.clone().unwrap();
        tokio::time::timeout(Duration::from_secs(5), gate.await_zero())
            .await
            .expect("Gate should open once the budget is spent");

        let snapshot = ctx.counters.snapshot_and_reset();
        assert_eq!(snapshot, RateSnapshot { succeeded: 20, failed: 5 });
        assert_eq!(ctx.failure_stats.get(FailureKind::ServerErrorStatus), 5);

        ctx.cancel.cancel();
        assert_eq!(pool.join(Duration::from_secs(5)).await, 25);
        assert_eq!(calls.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    async fn test_workers_exit_on_their_own_when_budget_is_claimed() {
        let ctx = context(1_000, Some(3));
        let calls = Arc::new(AtomicU64::new(0));
        let pool = WorkerPool::spawn(executors(5, &calls, 0), Arc::clone(&ctx));

        // No cancellation: workers must stop by themselves
        assert_eq!(pool.join(Duration::from_secs(5)).await, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unbounded_pool_runs_until_cancelled() {
        let ctx = context(100, None);
        let calls = Arc::new(AtomicU64::new(0));
        let pool = WorkerPool::spawn(executors(2, &calls, 0), Arc::clone(&ctx));

        tokio::time::sleep(Duration::from_millis(300)).await;
        ctx.cancel.cancel();
        let issued = pool.join(Duration::from_secs(5)).await;

        assert!(issued > 0);
        assert_eq!(issued, calls.load(Ordering::SeqCst));
        assert_eq!(ctx.counters.snapshot_and_reset().total(), issued);
    }

    #[tokio::test]
    async fn test_cancelled_worker_does_not_take_a_permit() {
        let ctx = context(1, None);
        ctx.cancel.cancel();
        let calls = Arc::new(AtomicU64::new(0));
        let issued = run_worker(0, executors(1, &calls, 0).remove(0), Arc::clone(&ctx)).await;
        assert_eq!(issued, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_applies_across_workers() {
        let ctx = context(20, Some(11)); // 10 intervals of 50ms
        let calls = Arc::new(AtomicU64::new(0));
        let start = std::time::Instant::now();
        let pool = WorkerPool::spawn(executors(4, &calls, 0), Arc::clone(&ctx));
        pool.join(Duration::from_secs(5)).await;
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(480),
            "11 requests at 20 qps finished in {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_join_times_out_on_stuck_worker() {
        let ctx = context(1_000, None);
        let calls = Arc::new(AtomicU64::new(0));
        let slow = vec![StubExecutor {
            calls: Arc::clone(&calls),
            fail_every: 0,
            delay: Duration::from_secs(30),
        }];
        let pool = WorkerPool::spawn(slow, Arc::clone(&ctx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel.cancel();

        let start = std::time::Instant::now();
        pool.join(Duration::from_millis(100)).await;
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_join_timeout_keeps_counts_of_finished_workers() {
        let ctx = context(1_000, None);
        let fast_calls = Arc::new(AtomicU64::new(0));
        let slow_calls = Arc::new(AtomicU64::new(0));
        let mixed = vec![
            StubExecutor {
                calls: Arc::clone(&fast_calls),
                fail_every: 0,
                delay: Duration::from_millis(1),
            },
            StubExecutor {
                calls: Arc::clone(&slow_calls),
                fail_every: 0,
                delay: Duration::from_secs(30),
            },
        ];
        let pool = WorkerPool::spawn(mixed, Arc::clone(&ctx));
        tokio::time::sleep(Duration::from_millis(200)).await;
        ctx.cancel.cancel();

        let start = std::time::Instant::now();
        let issued = pool.join(Duration::from_millis(300)).await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(issued > 0, "Fast worker should have issued requests");
        assert_eq!(issued, fast_calls.load(Ordering::SeqCst));
        assert_eq!(slow_calls.load(Ordering::SeqCst), 1);
    }
}
