//! Strategy error types.

use crate::browser::BrowserError;
use crate::decode::DecodeError;
use crate::transport::TransportError;
use thiserror::Error;

/// Errors that end a single strategy run.
///
/// The pipeline turns these into empty outcomes; they never reach callers
/// of a fetch.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The source answered but carried nothing usable.
    #[error("No usable fields found")]
    NoData,
}
