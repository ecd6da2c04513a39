//! Pipeline error types.

use super::StrategyAttempt;
use serde::Serialize;
use thiserror::Error;

/// No strategy produced a usable field.
///
/// Serializes as the structured error record handed to the presentation
/// layer, including the URL a human can open instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct AcquisitionFailure {
    pub issue_id: String,
    pub message: String,
    pub browser_url: String,
    pub attempts: Vec<StrategyAttempt>,
}
