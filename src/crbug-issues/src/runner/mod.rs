//! Concurrent fetches of several issues.

mod config;
mod error;

pub use config::{RunnerConfig, DEFAULT_CONCURRENCY};
pub use error::RunnerError;

use crate::config::TrackerConfig;
use crate::pipeline::AcquisitionPipeline;
use crate::search::{search_issues, SearchError, SearchResults};
use crate::summary::{FetchResult, RunSummary};
use crate::transport::{Endpoints, HttpUpstream, Upstream};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Fetches issues through one shared pipeline.
///
/// Each fetch runs its own strategies and, when needed, its own browser
/// session, so fetches share nothing but the HTTP client.
pub struct Runner {
    config: RunnerConfig,
    upstream: Arc<dyn Upstream>,
    endpoints: Endpoints,
    pipeline: AcquisitionPipeline,
}

impl Runner {
    /// Loads tracker configuration and builds the standard pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let mut tracker = TrackerConfig::load(config.config_path())?;
        if !config.browser() {
            tracker.browser.enabled = false;
        }

        let endpoints = tracker.endpoints()?;
        let upstream: Arc<dyn Upstream> = Arc::new(HttpUpstream::new(&tracker.tracker)?);
        let pipeline =
            AcquisitionPipeline::standard(Arc::clone(&upstream), endpoints.clone(), &tracker.browser);
        info!(strategies = ?pipeline.strategy_names(), "Runner ready");

        Ok(Self::with_parts(config, upstream, endpoints, pipeline))
    }

    /// Assembles a runner from prebuilt parts.
    #[must_use]
    pub fn with_parts(
        config: RunnerConfig,
        upstream: Arc<dyn Upstream>,
        endpoints: Endpoints,
        pipeline: AcquisitionPipeline,
    ) -> Self {
        Self {
            config,
            upstream,
            endpoints,
            pipeline,
        }
    }

    /// Fetches every id, at most `concurrency` at a time.
    ///
    /// Results come back in request order with duplicates removed.
    pub async fn fetch_issues(&self, ids: &[String]) -> (Vec<FetchResult>, RunSummary) {
        let mut seen = HashSet::new();
        let ids: Vec<&str> = ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .collect();

        let span = info_span!("fetch_issues", count = ids.len());
        async move {
            let mut results: Vec<(usize, FetchResult)> = stream::iter(ids.iter().enumerate())
                .map(|(index, id)| async move {
                    (index, FetchResult::from(self.pipeline.fetch(id).await))
                })
                .buffer_unordered(self.config.concurrency())
                .collect()
                .await;
            results.sort_by_key(|(index, _)| *index);

            let mut summary = RunSummary::new(ids.len());
            for (_, result) in &results {
                summary.record_result(result);
            }
            if summary.has_failures() {
                warn!(failed = summary.failed, "Some issues could not be fetched");
            }
            info!(resolved = summary.resolved, failed = summary.failed, "Run complete");

            (results.into_iter().map(|(_, result)| result).collect(), summary)
        }
        .instrument(span)
        .await
    }

    /// Runs a search query.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the query is blank or the request fails.
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, SearchError> {
        search_issues(self.upstream.as_ref(), &self.endpoints, query, limit).await
    }
}
