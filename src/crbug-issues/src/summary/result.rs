//! Fetch result types.

use crate::model::Issue;
use crate::pipeline::AcquisitionFailure;
use serde::Serialize;

/// Result of fetching a single issue.
///
/// Serializes as the bare issue or the bare failure record.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FetchResult {
    /// The issue was reconstructed.
    Resolved(Issue),

    /// No source had usable data.
    Failed(AcquisitionFailure),
}

impl FetchResult {
    /// Returns the requested issue id.
    #[must_use]
    pub fn issue_id(&self) -> &str {
        match self {
            Self::Resolved(issue) => &issue.id,
            Self::Failed(failure) => &failure.issue_id,
        }
    }

    /// Returns true if the issue was reconstructed.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl From<Result<Issue, AcquisitionFailure>> for FetchResult {
    fn from(result: Result<Issue, AcquisitionFailure>) -> Self {
        match result {
            Ok(issue) => Self::Resolved(issue),
            Err(failure) => Self::Failed(failure),
        }
    }
}
