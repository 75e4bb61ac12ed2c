//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{FailureKind, FailureStats};
use crate::LoadReport;

/// Prints a one-line summary of the run.
pub fn print_summary(report: &LoadReport) {
    info!(
        "Total: {} request{} ({} succeeded, {} failed) in {:.1}s{}",
        report.total(),
        if report.total() == 1 { "" } else { "s" },
        report.succeeded,
        report.failed,
        report.elapsed_seconds,
        if report.interrupted { " (interrupted)" } else { "" }
    );
}

/// Prints the failure breakdown, skipping categories that never occurred.
pub fn print_failure_statistics(stats: &FailureStats) {
    let total = stats.total();
    if total == 0 {
        return;
    }

    info!("Failure breakdown ({} total):", total);
    for kind in FailureKind::iter() {
        let count = stats.get(kind);
        if count > 0 {
            info!("   {}: {}", kind, count);
        }
    }
}
