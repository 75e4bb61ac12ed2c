//! Failure categorization.
//!
//! Maps non-success statuses and `reqwest` errors onto [`FailureKind`].

use reqwest::StatusCode;

use super::types::FailureKind;

/// Categorizes a received, non-2xx status code.
pub fn categorize_status(status: StatusCode) -> FailureKind {
    if status.is_informational() {
        FailureKind::InformationalStatus
    } else if status.is_redirection() {
        FailureKind::RedirectStatus
    } else if status.is_client_error() {
        FailureKind::ClientErrorStatus
    } else if status.is_server_error() {
        FailureKind::ServerErrorStatus
    } else {
        FailureKind::Other
    }
}

/// Categorizes a `reqwest::Error` into a [`FailureKind`].
///
/// Status information on the error takes precedence over the error kind, so a
/// status error is reported the same way as a non-2xx response.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FailureKind {
    if let Some(status) = error.status() {
        return categorize_status(status);
    }

    if error.is_builder() {
        FailureKind::Builder
    } else if error.is_redirect() {
        FailureKind::Redirect
    } else if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connect
    } else if error.is_request() {
        FailureKind::Request
    } else if error.is_body() || error.is_decode() {
        FailureKind::Body
    } else {
        FailureKind::Other
    }
}
