//! Tracker URL construction.

use url::Url;

/// Query parameter naming the tracker instance.
const TRACKER_QUERY_KEY: &str = "currentTrackerId";

/// Builds every URL the engine requests for one tracker instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
    tracker_id: String,
}

impl Endpoints {
    /// Creates endpoints rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn new(base_url: &str, tracker_id: impl Into<String>) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            base,
            tracker_id: tracker_id.into(),
        })
    }

    /// Tracker instance id.
    #[must_use]
    pub fn tracker_id(&self) -> &str {
        &self.tracker_id
    }

    /// Issue detail endpoint.
    #[must_use]
    pub fn issue_detail(&self, issue_id: &str) -> Url {
        self.tracked(&["action", "issues", issue_id])
    }

    /// Events feed endpoint.
    #[must_use]
    pub fn issue_events(&self, issue_id: &str) -> Url {
        self.tracked(&["action", "issues", issue_id, "events"])
    }

    /// Comments batch endpoint.
    #[must_use]
    pub fn issue_comments(&self, issue_id: &str) -> Url {
        self.tracked(&["action", "issues", issue_id, "comments"])
    }

    /// Search/list endpoint.
    #[must_use]
    pub fn issue_list(&self) -> Url {
        self.path(&["action", "issues", "list"])
    }

    /// Human-facing issue page. Also used for the plain page fetch.
    #[must_use]
    pub fn issue_page(&self, issue_id: &str) -> Url {
        self.path(&["issues", issue_id])
    }

    /// Human-facing search page, sent as the referer of list queries.
    #[must_use]
    pub fn search_page(&self, query: &str) -> Url {
        let mut url = self.path(&["issues"]);
        url.query_pairs_mut().append_pair("q", query);
        url
    }

    fn tracked(&self, segments: &[&str]) -> Url {
        let mut url = self.path(segments);
        url.query_pairs_mut()
            .append_pair(TRACKER_QUERY_KEY, &self.tracker_id);
        url
    }

    fn path(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
