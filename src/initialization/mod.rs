//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the resources a run needs:
//! - Logger
//! - Per-worker HTTP clients (timeouts, HTTP/2 prior knowledge, proxy)
//! - The shared rate limiter
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod rate_limiter;

// Re-export public API
pub use client::{init_client, init_clients};
pub use logger::{format_plain_line, init_logger_with, log_timestamp, print_fatal_error};
pub use rate_limiter::{init_rate_limiter, RateLimiter};
