//! Acquisition strategies.
//!
//! Each strategy reads one kind of upstream source and returns whatever
//! fields it could extract as a [`PartialRecord`]:
//! - [`DirectApiStrategy`] - structured JSON endpoints
//! - [`PageFetchStrategy`] - plain HTTP fetch of the issue page
//! - [`BrowserStrategy`] - DOM scraping through browser automation

mod browser;
mod direct;
mod error;
mod page;
mod patterns;

pub use browser::BrowserStrategy;
pub use direct::DirectApiStrategy;
pub use error::StrategyError;
pub use page::PageFetchStrategy;
pub use patterns::scan_page_text;

use crate::model::{PartialRecord, Provenance};
use async_trait::async_trait;

/// One named way of obtaining issue data.
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Kind of source; also the provenance of the fields it contributes.
    fn kind(&self) -> Provenance;

    /// Extracts what this source knows about `issue_id`.
    async fn acquire(&self, issue_id: &str) -> Result<PartialRecord, StrategyError>;
}

/// Returns [`StrategyError::NoData`] for records with neither fields nor
/// drift diagnostics.
pub(crate) fn non_empty(record: PartialRecord) -> Result<PartialRecord, StrategyError> {
    if record.is_empty() && record.schema_drift.is_empty() {
        Err(StrategyError::NoData)
    } else {
        Ok(record)
    }
}
