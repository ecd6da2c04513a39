//! Per-strategy outcomes.

use crate::model::{PartialRecord, Provenance};
use crate::strategies::StrategyError;
use serde::Serialize;

/// Result of running one strategy.
#[derive(Debug)]
pub enum StrategyOutcome {
    /// The strategy produced fields or drift diagnostics.
    Acquired(PartialRecord),
    /// The strategy failed or found nothing.
    Empty { reason: String },
}

impl StrategyOutcome {
    /// Folds a strategy result into an outcome. Errors never propagate.
    #[must_use]
    pub fn from_result(result: Result<PartialRecord, StrategyError>) -> Self {
        match result {
            Ok(record) if record.is_empty() && record.schema_drift.is_empty() => Self::Empty {
                reason: StrategyError::NoData.to_string(),
            },
            Ok(record) => Self::Acquired(record),
            Err(e) => Self::Empty {
                reason: e.to_string(),
            },
        }
    }
}

/// Record of one strategy run, reported with failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAttempt {
    pub strategy: String,
    pub kind: Provenance,
    pub acquired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StrategyAttempt {
    /// Summarizes `outcome` for the strategy called `strategy`.
    #[must_use]
    pub fn new(strategy: &str, kind: Provenance, outcome: &StrategyOutcome) -> Self {
        let (acquired, reason) = match outcome {
            StrategyOutcome::Acquired(record) => (!record.is_empty(), None),
            StrategyOutcome::Empty { reason } => (false, Some(reason.clone())),
        };
        Self {
            strategy: strategy.to_string(),
            kind,
            acquired,
            reason,
        }
    }
}
