//! Main application modules.
//!
//! This module provides rate reporting, shutdown handling, and statistics
//! printing used by the orchestrator.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::{log_rates, Reporter};
pub use shutdown::{shutdown_gracefully, ShutdownTotals, StopReason};
pub use statistics::{print_failure_statistics, print_summary};
