//! Ordered acquisition of one issue.
//!
//! Direct strategies run first. When their merged result is sufficient the
//! pipeline stops there; otherwise every remaining strategy runs in order and
//! its result is merged. Strategy failures are logged and recorded, never
//! propagated.

mod error;
mod outcome;

pub use error::AcquisitionFailure;
pub use outcome::{StrategyAttempt, StrategyOutcome};

use crate::browser::DriverAutomation;
use crate::config::BrowserSettings;
use crate::merge::ResultMerger;
use crate::model::{Issue, Provenance};
use crate::strategies::{
    AcquisitionStrategy, BrowserStrategy, DirectApiStrategy, PageFetchStrategy,
};
use crate::transport::{Endpoints, Upstream};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Runs strategies for one issue and merges their records.
#[derive(Clone)]
pub struct AcquisitionPipeline {
    strategies: Vec<Arc<dyn AcquisitionStrategy>>,
    endpoints: Endpoints,
}

impl AcquisitionPipeline {
    /// Creates a pipeline with no strategies.
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            strategies: Vec::new(),
            endpoints,
        }
    }

    /// Appends a strategy. Run order follows insertion order within the
    /// direct and non-direct groups.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Arc<dyn AcquisitionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Builds the standard direct, page fetch and browser chain.
    ///
    /// The browser strategy is left out when `browser.enabled` is false.
    #[must_use]
    pub fn standard(
        upstream: Arc<dyn Upstream>,
        endpoints: Endpoints,
        browser: &BrowserSettings,
    ) -> Self {
        let mut pipeline = Self::new(endpoints.clone())
            .with_strategy(Arc::new(DirectApiStrategy::new(
                Arc::clone(&upstream),
                endpoints.clone(),
            )))
            .with_strategy(Arc::new(PageFetchStrategy::new(upstream, endpoints.clone())));

        if browser.enabled {
            let automation = Arc::new(DriverAutomation::new(browser));
            pipeline = pipeline.with_strategy(Arc::new(BrowserStrategy::new(
                automation, endpoints, browser,
            )));
        }
        pipeline
    }

    /// Names of the configured strategies in run order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.ordered().map(|strategy| strategy.name()).collect()
    }

    /// Reconstructs the issue `issue_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionFailure`] when no strategy produced a usable
    /// field.
    pub async fn fetch(&self, issue_id: &str) -> Result<Issue, AcquisitionFailure> {
        let span = info_span!("fetch_issue", issue_id = %issue_id);
        async move {
            info!("Fetching issue");
            let mut merger = ResultMerger::new(issue_id);
            let mut attempts = Vec::with_capacity(self.strategies.len());

            let (direct, fallback): (Vec<_>, Vec<_>) = self
                .strategies
                .iter()
                .partition(|strategy| strategy.kind() == Provenance::Direct);

            for strategy in direct {
                self.run(strategy.as_ref(), issue_id, &mut merger, &mut attempts)
                    .await;
            }

            if merger.is_sufficient() {
                info!("Direct data sufficient");
            } else {
                for strategy in fallback {
                    self.run(strategy.as_ref(), issue_id, &mut merger, &mut attempts)
                        .await;
                }
            }

            if !merger.has_contributions() {
                warn!(attempts = attempts.len(), "No strategy produced usable data");
                return Err(AcquisitionFailure {
                    issue_id: issue_id.to_string(),
                    message: format!("Could not retrieve issue {issue_id} from any source"),
                    browser_url: self.endpoints.issue_page(issue_id).to_string(),
                    attempts,
                });
            }

            let issue = merger.finish();
            info!(
                provenance = %issue.provenance,
                comments = issue.comments.len(),
                "Issue reconstructed"
            );
            Ok(issue)
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        strategy: &dyn AcquisitionStrategy,
        issue_id: &str,
        merger: &mut ResultMerger,
        attempts: &mut Vec<StrategyAttempt>,
    ) {
        let span = info_span!("strategy", strategy = strategy.name());
        let outcome = StrategyOutcome::from_result(
            strategy.acquire(issue_id).instrument(span.clone()).await,
        );

        attempts.push(StrategyAttempt::new(strategy.name(), strategy.kind(), &outcome));
        span.in_scope(|| match outcome {
            StrategyOutcome::Acquired(record) => {
                merger.absorb(strategy.kind(), record);
            }
            StrategyOutcome::Empty { reason } => {
                warn!(reason = %reason, "Strategy produced no data");
            }
        });
    }

    fn ordered(&self) -> impl Iterator<Item = &Arc<dyn AcquisitionStrategy>> {
        let direct = self
            .strategies
            .iter()
            .filter(|strategy| strategy.kind() == Provenance::Direct);
        let fallback = self
            .strategies
            .iter()
            .filter(|strategy| strategy.kind() != Provenance::Direct);
        direct.chain(fallback)
    }
}
