//! Transport error types.

use thiserror::Error;

/// Errors that can occur while talking to the tracker over HTTP.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Invalid header value in configuration.
    #[error("Invalid header value for '{header}'")]
    InvalidHeader { header: &'static str },

    /// The request could not be sent or timed out.
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The tracker answered with a non-success status.
    #[error("Request to '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be read.
    #[error("Failed to read response body from '{url}': {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
