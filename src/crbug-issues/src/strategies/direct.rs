//! Structured JSON endpoints.

use super::{non_empty, AcquisitionStrategy, StrategyError};
use crate::decode::{decode_response, parse_body};
use crate::model::{PartialRecord, Provenance};
use crate::transport::{Endpoints, Upstream};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Reads the detail endpoint and the events feed, falling back to the
/// comments batch endpoint when the feed had no comments.
///
/// Individual endpoint failures are tolerated; the strategy only fails when
/// every endpoint it tried failed.
pub struct DirectApiStrategy {
    upstream: Arc<dyn Upstream>,
    endpoints: Endpoints,
}

impl DirectApiStrategy {
    #[must_use]
    pub fn new(upstream: Arc<dyn Upstream>, endpoints: Endpoints) -> Self {
        Self {
            upstream,
            endpoints,
        }
    }

    async fn fetch_json(&self, url: &Url) -> Result<Value, StrategyError> {
        let body = self.upstream.get_text(url).await?;
        Ok(parse_body(&body)?)
    }

    async fn read_into(&self, url: &Url, record: &mut PartialRecord) -> Result<(), StrategyError> {
        match self.fetch_json(url).await {
            Ok(node) => {
                let decoded = decode_response(&node);
                debug!(
                    url = %url,
                    comments = decoded.comments.len(),
                    drift = decoded.schema_drift.len(),
                    "Decoded endpoint"
                );
                record.fill_from(decoded);
                Ok(())
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Endpoint failed");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for DirectApiStrategy {
    fn name(&self) -> &'static str {
        "direct-api"
    }

    fn kind(&self) -> Provenance {
        Provenance::Direct
    }

    async fn acquire(&self, issue_id: &str) -> Result<PartialRecord, StrategyError> {
        let mut record = PartialRecord::default();
        let mut results = Vec::with_capacity(3);

        for url in [
            self.endpoints.issue_detail(issue_id),
            self.endpoints.issue_events(issue_id),
        ] {
            results.push(self.read_into(&url, &mut record).await);
        }
        if record.comments.is_empty() {
            let url = self.endpoints.issue_comments(issue_id);
            results.push(self.read_into(&url, &mut record).await);
        }

        if results.iter().all(Result::is_err) {
            if let Some(Err(e)) = results.into_iter().next() {
                return Err(e);
            }
        }
        non_empty(record)
    }
}
