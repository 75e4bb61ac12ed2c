//! Error handling and request outcome statistics.
//!
//! This module provides:
//! - Fatal error types for configuration and initialization
//! - Failure categories for individual requests and their categorization
//! - Lock-free outcome counters shared by workers and the reporter

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, categorize_status};
pub use stats::{FailureStats, RateSnapshot, RequestCounters};
pub use types::{ConfigError, FailureKind, InitializationError};
