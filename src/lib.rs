//! http_loadgen library: rate-limited HTTP load generation
//!
//! This library drives a fixed pool of workers, each with its own HTTP client,
//! against a single URL at a target aggregate request rate, and reports how many
//! requests succeeded and failed every second.
//!
//! # Example
//!
//! ```no_run
//! use http_loadgen::{Config, run_load};
//! use tokio;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::new("http://localhost:8080/health".parse()?);
//! config.clients = 4;
//! config.qps = 50;
//! config.number = 500;
//!
//! let report = run_load(config).await?;
//! println!("{} succeeded, {} failed", report.succeeded, report.failed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a multi-threaded Tokio runtime. Use `#[tokio::main]` in
//! your application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod app;
mod completion_gate;
pub mod config;
mod error_handling;
mod fetch;
pub mod initialization;
mod run;

// Re-export public API
pub use completion_gate::{CompletionGate, CompletionGuard};
pub use config::{Config, HttpMethod, LogFormat, LogLevel, Opt, ProxyAddress};
pub use error_handling::{
    ConfigError, FailureKind, FailureStats, InitializationError, RateSnapshot, RequestCounters,
};
pub use fetch::{HttpExecutor, RequestExecutor, RequestOutcome};
pub use run::{run_load, run_load_until, run_with_executors, LoadReport};
