//! HTTP client initialization.
//!
//! Every worker gets its own client, so connection reuse and HTTP/2 streams
//! stay private to that worker's request sequence.

use std::time::Duration;

use reqwest::{ClientBuilder, Proxy};

use crate::config::{Config, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::InitializationError;

/// Initializes one worker's HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Request timeout from the configuration, capped connect timeout
/// - HTTP/2 prior knowledge when enabled (no ALPN/upgrade negotiation)
/// - All traffic routed through the upstream proxy when one is set
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the proxy URL is rejected
/// or the client cannot be built.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    let connect_timeout = timeout.min(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS));

    let mut builder = ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(config.user_agent.clone());

    if config.http2_prior_knowledge {
        builder = builder.http2_prior_knowledge();
    }

    builder = match &config.proxy {
        Some(proxy) => builder.proxy(Proxy::all(proxy.to_url())?),
        // Ignore HTTP(S)_PROXY from the environment; only --proxy routes traffic
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}

/// Initializes one independently configured client per worker.
pub fn init_clients(config: &Config) -> Result<Vec<reqwest::Client>, InitializationError> {
    (0..config.clients).map(|_| init_client(config)).collect()
}
