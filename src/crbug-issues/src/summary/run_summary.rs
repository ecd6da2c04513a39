//! Run summary types.

use super::result::FetchResult;
use crate::model::Provenance;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of distinct issues requested.
    pub requested: usize,

    /// Number of issues reconstructed.
    pub resolved: usize,

    /// Number of issues no source had data for.
    pub failed: usize,

    /// Resolved issues whose final data came from the structured endpoints.
    pub from_direct: usize,

    /// Resolved issues whose final data came from the page fetch.
    pub from_page_fetch: usize,

    /// Resolved issues whose final data came from browser automation.
    pub from_browser: usize,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Default::default()
        }
    }

    /// Updates the summary with a fetch result.
    pub fn record_result(&mut self, result: &FetchResult) {
        match result {
            FetchResult::Resolved(issue) => {
                self.resolved += 1;
                match issue.provenance {
                    Provenance::Direct => self.from_direct += 1,
                    Provenance::PageFetch => self.from_page_fetch += 1,
                    Provenance::BrowserAutomation => self.from_browser += 1,
                }
            }
            FetchResult::Failed(_) => self.failed += 1,
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns true if every requested issue was reconstructed.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.failed == 0 && self.resolved == self.requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge;
    use crate::model::PartialRecord;
    use crate::pipeline::AcquisitionFailure;

    #[test]
    fn can_record_result() {
        let mut summary = RunSummary::new(2);

        let issue = merge(
            "1493929",
            [(
                Provenance::BrowserAutomation,
                PartialRecord {
                    title: Some("Crash in compositor".to_string()),
                    ..Default::default()
                },
            )],
        );
        summary.record_result(&FetchResult::Resolved(issue));
        assert!(!summary.all_success());

        summary.record_result(&FetchResult::Failed(AcquisitionFailure {
            issue_id: "40063133".to_string(),
            message: "Could not retrieve issue 40063133 from any source".to_string(),
            browser_url: "https://issues.chromium.org/issues/40063133".to_string(),
            attempts: Vec::new(),
        }));

        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.from_browser, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());
        assert!(!summary.all_success());
    }
}
