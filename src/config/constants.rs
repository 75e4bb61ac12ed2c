//! Configuration constants.
//!
//! This module defines the defaults and operational parameters used throughout
//! the load generator: reporting cadence, shutdown bounds and HTTP timeouts.

use std::time::Duration;

/// Default number of concurrent workers (`--client`)
pub const DEFAULT_CLIENTS: usize = 1;

/// Default aggregate request rate (`--qps`)
pub const DEFAULT_QPS: u32 = 10;

/// Default request budget (`--number`). Zero means the run never stops on its own.
pub const DEFAULT_NUMBER: u64 = 0;

/// Period of the rate reporter.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on how long shutdown waits for in-flight requests to drain.
///
/// After this the run finishes regardless; any worker still mid-request is
/// abandoned and its outcome is not reported.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Process exit code when a second Ctrl-C skips the drain (128 + SIGINT).
pub const FORCED_EXIT_CODE: i32 = 130;

/// Per-request timeout in seconds (covers connect, send and response).
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent string for generated requests.
pub const DEFAULT_USER_AGENT: &str = concat!("http_loadgen/", env!("CARGO_PKG_VERSION"));

/// Message reported when `--url` is missing or blank.
pub const MISSING_URL_MESSAGE: &str = "Not url provided, please set url by --url=<...>";
