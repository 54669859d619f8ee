//! Error types for building the HTTP adapter

use thiserror::Error;

/// Errors raised while constructing [`HttpChatTransport`](super::HttpChatTransport).
///
/// Failures of individual requests are reported as
/// [`TransportError`](campus_application::TransportError) instead.
#[derive(Error, Debug)]
pub enum HttpTransportError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
