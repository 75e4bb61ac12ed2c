//! Single-request execution.
//!
//! A worker only needs one capability from the transport: issue one request
//! and say whether it succeeded. [`RequestExecutor`] is that seam;
//! [`HttpExecutor`] is the `reqwest` implementation each worker owns.

use std::future::Future;

use log::{debug, warn};
use url::Url;

use crate::config::HttpMethod;
use crate::error_handling::{categorize_reqwest_error, categorize_status, FailureKind};

/// Outcome of one request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A 2xx response was received
    Success,
    /// Any other status, or a transport error
    Failure(FailureKind),
}

impl RequestOutcome {
    /// Whether the request received a 2xx response.
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success)
    }
}

/// Issues one request and classifies the result.
///
/// Implementations must never fail: every error is folded into
/// [`RequestOutcome::Failure`].
pub trait RequestExecutor: Send + Sync + 'static {
    /// Sends one request and reports how it went.
    fn execute(&self) -> impl Future<Output = RequestOutcome> + Send;
}

/// `reqwest`-backed executor owning one worker's client.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    url: Url,
    method: reqwest::Method,
}

impl HttpExecutor {
    /// Creates an executor sending `method` requests to `url` through `client`.
    pub fn new(client: reqwest::Client, url: Url, method: HttpMethod) -> Self {
        Self {
            client,
            url,
            method: method.into(),
        }
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RequestExecutor for HttpExecutor {
    async fn execute(&self) -> RequestOutcome {
        let mut request = self.client.request(self.method.clone(), self.url.clone());
        if self.method == reqwest::Method::POST {
            request = request.body(Vec::new());
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                // Drain the body so the connection can be reused
                let body = response.bytes().await;
                if !status.is_success() {
                    debug!("{} {} returned {}", self.method, self.url, status);
                    return RequestOutcome::Failure(categorize_status(status));
                }
                match body {
                    Ok(_) => RequestOutcome::Success,
                    Err(e) => {
                        warn!("Failed to read response body from {}: {e}", self.url);
                        RequestOutcome::Failure(categorize_reqwest_error(&e))
                    }
                }
            }
            Err(e) => {
                warn!("Request to {} failed: {e}", self.url);
                RequestOutcome::Failure(categorize_reqwest_error(&e))
            }
        }
    }
}
