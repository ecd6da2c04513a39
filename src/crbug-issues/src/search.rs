//! Issue search over the list endpoint.

use crate::decode::{decode_search_results, parse_body, DecodeError, IssueSummary};
use crate::transport::{Endpoints, TransportError, Upstream};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, info_span, Instrument};

/// Page size used when the caller does not choose one.
pub const DEFAULT_SEARCH_LIMIT: usize = 25;

/// Errors that can occur while searching.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to decode search response: {0}")]
    Decode(#[from] DecodeError),
}

/// Decoded issue rows for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub issues: Vec<IssueSummary>,
}

/// Builds the positional list request body.
#[must_use]
pub fn list_request_body(tracker_id: &str, query: &str, limit: usize) -> Value {
    json!([
        null,
        null,
        null,
        null,
        null,
        [tracker_id],
        [query, null, limit, "start_index:0"]
    ])
}

/// Runs `query` against the list endpoint.
///
/// Unlike single-issue fetches there is no fallback source, so transport and
/// decode errors are returned as is.
///
/// # Errors
///
/// Returns [`SearchError`] if the query is blank, the request fails or the
/// body is not JSON.
pub async fn search_issues(
    upstream: &dyn Upstream,
    endpoints: &Endpoints,
    query: &str,
    limit: usize,
) -> Result<SearchResults, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let span = info_span!("search", query = %query, limit);
    async move {
        let body = list_request_body(endpoints.tracker_id(), query, limit.max(1));
        let referer = endpoints.search_page(query);
        let text = upstream
            .post_json(&endpoints.issue_list(), &body, Some(&referer))
            .await?;

        let issues = decode_search_results(&parse_body(&text)?);
        info!(count = issues.len(), "Search complete");
        Ok(SearchResults {
            query: query.to_string(),
            issues,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeUpstream;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://issues.chromium.org", "157").unwrap()
    }

    #[test]
    fn can_build_list_body() {
        assert_eq!(
            list_request_body("157", "status:open", 50).to_string(),
            r#"[null,null,null,null,null,["157"],["status:open",null,50,"start_index:0"]]"#
        );
    }

    #[tokio::test]
    async fn can_search() {
        let upstream = FakeUpstream::new().with_body(
            "/action/issues/list",
            r#")]}'
[["b.ListIssuesResponse",[[null,1493929,[null,1,2,1,3,"Crash in compositor"]],[null,7,[]]]]]"#,
        );

        let results = search_issues(&upstream, &endpoints(), " compositor ", 10)
            .await
            .unwrap();

        assert_eq!(results.query, "compositor");
        assert_eq!(results.issues.len(), 1);
        assert_eq!(results.issues[0].id, "1493929");
        assert_eq!(
            upstream.posted.lock().unwrap()[0],
            list_request_body("157", "compositor", 10)
        );
    }

    #[tokio::test]
    async fn rejects_blank_queries() {
        let upstream = FakeUpstream::new();
        let result = search_issues(&upstream, &endpoints(), "   ", 10).await;
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
        assert!(upstream.requested_paths().is_empty());
    }

    #[tokio::test]
    async fn surfaces_transport_errors() {
        let upstream = FakeUpstream::new().with_status("/action/issues/list", 403);
        let result = search_issues(&upstream, &endpoints(), "crash", 10).await;
        assert!(matches!(
            result,
            Err(SearchError::Transport(TransportError::Status { status: 403, .. }))
        ));
    }
}
