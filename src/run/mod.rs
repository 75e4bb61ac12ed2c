//! Run orchestration.
//!
//! Builds the shared state, launches the worker pool and the reporter, waits for
//! the budget to be spent or for an interruption, then shuts everything down.

mod worker;

pub use worker::{WorkerContext, WorkerPool};

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{self, Stream, StreamExt};
use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::app::{
    print_failure_statistics, print_summary, shutdown_gracefully, Reporter, StopReason,
};
use crate::completion_gate::CompletionGate;
use crate::config::{Config, FORCED_EXIT_CODE, REPORT_INTERVAL, SHUTDOWN_TIMEOUT};
use crate::error_handling::{FailureStats, RequestCounters};
use crate::fetch::{HttpExecutor, RequestExecutor};
use crate::initialization::{init_clients, init_rate_limiter};

/// Results of a load run.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Requests that received a 2xx response
    pub succeeded: u64,
    /// Requests that failed (non-2xx or transport error)
    pub failed: u64,
    /// Requests issued by workers that exited within the drain timeout
    pub issued: u64,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
    /// Whether the run was stopped by an interruption rather than by its budget
    pub interrupted: bool,
}

impl LoadReport {
    /// Completed requests (succeeded + failed).
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Runs a load test until its budget is spent or Ctrl-C is pressed.
///
/// This is the main entry point for the library. With `config.number == 0` the
/// run only ends on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the HTTP clients cannot
/// be built. Individual request failures never end the run.
///
/// # Example
///
/// ```no_run
/// use http_loadgen::{run_load, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::new("http://localhost:8080/".parse()?);
/// config.number = 100;
/// let report = run_load(config).await?;
/// println!("{} succeeded, {} failed", report.succeeded, report.failed);
/// # Ok(())
/// # }
/// ```
pub async fn run_load(config: Config) -> Result<LoadReport> {
    let interrupt = CancellationToken::new();
    let signals = Box::pin(stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                None
            }
        }
    }));
    let signal_task = tokio::spawn(watch_interrupts(signals, interrupt.clone(), || {
        error!("Received second Ctrl+C, exiting without draining");
        std::process::exit(FORCED_EXIT_CODE);
    }));

    let result = run_load_until(config, interrupt).await;
    signal_task.abort();
    result
}

/// Cancels `interrupt` on the first signal and calls `force_exit` on the second.
async fn watch_interrupts<S, F>(mut signals: S, interrupt: CancellationToken, force_exit: F)
where
    S: Stream<Item = ()> + Unpin,
    F: FnOnce(),
{
    if signals.next().await.is_none() {
        return;
    }
    info!("Received Ctrl+C, shutting down (press again to exit immediately)");
    interrupt.cancel();

    if signals.next().await.is_some() {
        force_exit();
    }
}

/// Runs a load test until its budget is spent or `interrupt` is cancelled.
pub async fn run_load_until(config: Config, interrupt: CancellationToken) -> Result<LoadReport> {
    config.validate().context("Invalid configuration")?;

    let clients = init_clients(&config).context("Failed to initialize HTTP clients")?;
    let executors = clients
        .into_iter()
        .map(|client| HttpExecutor::new(client, config.url.clone(), config.method))
        .collect();

    run_with_executors(&config, executors, interrupt).await
}

/// Runs a load test with caller-supplied executors, one per worker.
///
/// `config.clients` is ignored in favour of `executors.len()`.
pub async fn run_with_executors<E: RequestExecutor>(
    config: &Config,
    executors: Vec<E>,
    interrupt: CancellationToken,
) -> Result<LoadReport> {
    config.validate().context("Invalid configuration")?;
    anyhow::ensure!(!executors.is_empty(), "At least one executor is required");

    info!(
        "clients={}, qps={}, proxy={}, http2PriorKnowledge={}, url={}, number={}",
        executors.len(),
        config.qps,
        config
            .proxy
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string),
        config.http2_prior_knowledge,
        config.url,
        config.number
    );

    let limiter = init_rate_limiter(config.qps).context("Failed to initialize rate limiter")?;
    let counters = Arc::new(RequestCounters::new());
    let failure_stats = Arc::new(FailureStats::new());
    let gate = config.budget().map(|budget| Arc::new(CompletionGate::new(budget)));
    let cancel_workers = interrupt.child_token();

    let ctx = Arc::new(WorkerContext {
        limiter,
        counters: Arc::clone(&counters),
        failure_stats: Arc::clone(&failure_stats),
        gate: gate.clone(),
        cancel: cancel_workers.clone(),
    });

    let start_time = Instant::now();
    let workers = WorkerPool::spawn(executors, ctx);
    let reporter = Reporter::spawn(Arc::clone(&counters), REPORT_INTERVAL);

    let reason = match &gate {
        Some(gate) => tokio::select! {
            _ = gate.await_zero() => StopReason::BudgetExhausted,
            _ = interrupt.cancelled() => StopReason::Interrupted,
        },
        None => {
            interrupt.cancelled().await;
            StopReason::Interrupted
        }
    };

    let totals = shutdown_gracefully(
        reason,
        &cancel_workers,
        workers,
        reporter,
        &counters,
        SHUTDOWN_TIMEOUT,
    )
    .await;

    let report = LoadReport {
        succeeded: totals.reported.succeeded,
        failed: totals.reported.failed,
        issued: totals.issued,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
        interrupted: reason == StopReason::Interrupted,
    };

    print_summary(&report);
    print_failure_statistics(&failure_stats);

    Ok(report)
}
