//! Decode error types.

use thiserror::Error;

/// Errors that can occur while turning an upstream body into JSON.
///
/// Shape mismatches inside a parsed body are never errors; the decoders
/// skip them.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was empty after removing the anti-hijacking prefix.
    #[error("Upstream body is empty")]
    EmptyBody,

    /// The body is not valid JSON.
    #[error("Failed to parse upstream body as JSON: {0}")]
    Json(#[from] serde_json::Error),
}
