//! Error type definitions.
//!
//! This module defines the fatal error types raised before a run starts and the
//! failure categories recorded for individual requests while it runs.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::MISSING_URL_MESSAGE;

/// Fatal configuration errors.
///
/// Any of these stops the process before a single worker is started.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `--url` was not supplied or was blank.
    #[error("{}", MISSING_URL_MESSAGE)]
    MissingUrl,

    /// `--url` could not be parsed or uses an unsupported scheme.
    #[error("Invalid url '{url}': {reason}")]
    InvalidUrl {
        /// The rejected value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// `--proxy` is not of the form `host:port`.
    #[error("Invalid proxy '{0}', expected host:port")]
    InvalidProxy(String),

    /// `--client` was zero.
    #[error("Client count must be greater than 0")]
    InvalidClients,

    /// `--qps` was zero.
    #[error("QPS must be greater than 0")]
    InvalidQps,

    /// `--timeout-seconds` was zero.
    #[error("Request timeout must be greater than 0 seconds")]
    InvalidTimeout,
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing a worker's HTTP client (including proxy setup).
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Why a single request was classified as a failure.
///
/// Status variants cover responses that arrived with a non-2xx code; the rest
/// cover transport-level errors reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    // Responses received with a non-success status
    /// 1xx
    InformationalStatus,
    /// 3xx (redirect limit reached or not followed)
    RedirectStatus,
    /// 4xx
    ClientErrorStatus,
    /// 5xx
    ServerErrorStatus,
    // Transport errors
    /// Request or connect timeout
    Timeout,
    /// Connection could not be established
    Connect,
    /// Request could not be sent
    Request,
    /// Response body could not be read
    Body,
    /// Redirect policy error
    Redirect,
    /// Request could not be built
    Builder,
    /// Anything else
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    /// Human-readable label used in the failure breakdown.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InformationalStatus => "Informational status (1xx)",
            FailureKind::RedirectStatus => "Redirect status (3xx)",
            FailureKind::ClientErrorStatus => "Client error status (4xx)",
            FailureKind::ServerErrorStatus => "Server error status (5xx)",
            FailureKind::Timeout => "HTTP request timeout error",
            FailureKind::Connect => "HTTP request connect error",
            FailureKind::Request => "HTTP request error",
            FailureKind::Body => "HTTP request body error",
            FailureKind::Redirect => "HTTP request redirect error",
            FailureKind::Builder => "HTTP request builder error",
            FailureKind::Other => "HTTP request other error",
        }
    }

    /// Whether this failure came from a received response rather than a transport error.
    pub fn is_status(&self) -> bool {
        matches!(
            self,
            FailureKind::InformationalStatus
                | FailureKind::RedirectStatus
                | FailureKind::ClientErrorStatus
                | FailureKind::ServerErrorStatus
        )
    }
}
