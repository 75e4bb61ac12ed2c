//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, timeouts, reporting cadence)
//! - CLI option types and parsing
//! - The validated library configuration

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    parse_target_url, Config, HttpMethod, LogFormat, LogLevel, Opt, ProxyAddress,
};
