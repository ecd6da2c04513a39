//! DOM scraping through browser automation.

use super::patterns::scan_page_text;
use super::{non_empty, AcquisitionStrategy, StrategyError};
use crate::browser::{AutomationSession, BrowserAutomation, BrowserError, SessionGuard};
use crate::config::BrowserSettings;
use crate::decode::text::{clean_content, is_migration_artifact, is_substantive};
use crate::model::{Comment, PartialRecord, Provenance};
use crate::transport::Endpoints;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Selectors tried in order; the first one with text wins.
const TITLE_SELECTORS: &[&str] = &[
    "[data-test-id='issue-title']",
    "b-issue-title",
    "h1.issue-title",
    "h1",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "[data-test-id='issue-description']",
    "b-issue-description",
    ".issue-description",
];

const COMMENT_BODY_SELECTORS: &[&str] = &[
    "[data-test-id='comment-body']",
    "b-issue-comment .comment-body",
    ".comment-content",
];

const COMMENT_AUTHOR_SELECTORS: &[&str] = &[
    "[data-test-id='comment-author']",
    "b-issue-comment .comment-author",
    ".comment-author",
];

const UNKNOWN_AUTHOR: &str = "unknown";

/// Renders `/issues/{id}` in a browser session and reads the DOM.
///
/// Navigation that times out is not fatal: whatever rendered by then is
/// extracted.
pub struct BrowserStrategy {
    automation: Arc<dyn BrowserAutomation>,
    endpoints: Endpoints,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl BrowserStrategy {
    #[must_use]
    pub fn new(
        automation: Arc<dyn BrowserAutomation>,
        endpoints: Endpoints,
        settings: &BrowserSettings,
    ) -> Self {
        Self {
            automation,
            endpoints,
            navigation_timeout: settings.navigation_timeout(),
            settle_delay: settings.settle_delay(),
        }
    }

    async fn extract(
        &self,
        session: &mut dyn AutomationSession,
        url: &str,
    ) -> Result<PartialRecord, StrategyError> {
        match session.navigate(url, self.navigation_timeout).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                warn!(url, error = %e, "Navigation timed out, extracting partial page");
            }
            Err(e) => return Err(e.into()),
        }
        tokio::time::sleep(self.settle_delay).await;

        let mut record = PartialRecord {
            title: first_text(session, TITLE_SELECTORS).await,
            description: first_text(session, DESCRIPTION_SELECTORS).await,
            comments: comments(session).await,
            ..Default::default()
        };

        match session.page_text().await {
            Ok(text) => record.fill_from(scan_page_text(&text)),
            Err(e) => debug!(error = %e, "Page text unavailable"),
        }
        Ok(record)
    }
}

#[async_trait]
impl AcquisitionStrategy for BrowserStrategy {
    fn name(&self) -> &'static str {
        "browser-automation"
    }

    fn kind(&self) -> Provenance {
        Provenance::BrowserAutomation
    }

    async fn acquire(&self, issue_id: &str) -> Result<PartialRecord, StrategyError> {
        let url = self.endpoints.issue_page(issue_id);
        let mut guard = SessionGuard::acquire(self.automation.as_ref()).await?;

        let extracted = self.extract(guard.session(), url.as_str()).await;

        if let Err(e) = guard.release().await {
            warn!(error = %e, "Failed to close browser session");
        }
        non_empty(extracted?)
    }
}

async fn first_text(session: &mut dyn AutomationSession, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        match session.query_text(selector).await {
            Ok(Some(text)) => {
                let text = clean_content(&text);
                if !text.is_empty() {
                    return Some(text);
                }
            }
            Ok(None) => {}
            Err(e) => log_query_error(selector, &e),
        }
    }
    None
}

async fn all_text(session: &mut dyn AutomationSession, selectors: &[&str]) -> Vec<String> {
    for selector in selectors {
        match session.query_all_text(selector).await {
            Ok(texts) if !texts.is_empty() => return texts,
            Ok(_) => {}
            Err(e) => log_query_error(selector, &e),
        }
    }
    Vec::new()
}

async fn comments(session: &mut dyn AutomationSession) -> Vec<Comment> {
    let bodies = all_text(session, COMMENT_BODY_SELECTORS).await;
    if bodies.is_empty() {
        return Vec::new();
    }
    let authors = all_text(session, COMMENT_AUTHOR_SELECTORS).await;

    bodies
        .iter()
        .enumerate()
        .filter_map(|(index, body)| {
            let content = clean_content(body);
            if !is_substantive(&content) || is_migration_artifact(&content) {
                return None;
            }
            let author = authors
                .get(index)
                .map(|author| author.trim())
                .filter(|author| !author.is_empty())
                .unwrap_or(UNKNOWN_AUTHOR);
            Some(Comment {
                author: author.to_string(),
                timestamp: None,
                content,
            })
        })
        .collect()
}

fn log_query_error(selector: &str, error: &BrowserError) {
    debug!(selector, error = %error, "Selector query failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IssueType, Priority};
    use crate::testing::{PageScript, ScriptedAutomation};

    fn strategy(automation: Arc<ScriptedAutomation>) -> BrowserStrategy {
        BrowserStrategy::new(
            automation,
            Endpoints::new("https://issues.chromium.org", "157").unwrap(),
            &BrowserSettings {
                settle_delay_ms: 0,
                ..BrowserSettings::default()
            },
        )
    }

    fn rendered_issue() -> PageScript {
        let mut script = PageScript::default();
        script
            .texts
            .insert("h1".to_string(), "  Tab crashes on print preview ".to_string());
        script.lists.insert(
            ".comment-content".to_string(),
            vec![
                "Print preview crashes the tab every time.".to_string(),
                "[empty comment from monorail migration]".to_string(),
                "short".to_string(),
            ],
        );
        script
            .lists
            .insert(".comment-author".to_string(), vec!["dev@chromium.org".to_string()]);
        script.page_text =
            "Priority P1 Type Feature Reporter someone@chromium.org Fixed in CL 6624568"
                .to_string();
        script
    }

    #[tokio::test]
    async fn can_scrape_rendered_issue() {
        let automation = Arc::new(ScriptedAutomation::new(rendered_issue()));
        let record = strategy(automation.clone()).acquire("9").await.unwrap();

        assert_eq!(record.title.as_deref(), Some("Tab crashes on print preview"));
        assert_eq!(record.comments.len(), 1);
        assert_eq!(record.comments[0].author, "dev@chromium.org");
        assert_eq!(record.priority, Some(Priority::P1));
        assert_eq!(record.issue_type, Some(IssueType::Feature));
        assert_eq!(record.reporter.as_deref(), Some("someone@chromium.org"));
        assert_eq!(record.related_change_ids, vec!["6624568"]);
        assert_eq!(automation.counters.opened(), 1);
        assert_eq!(automation.counters.closed(), 1);
    }

    #[tokio::test]
    async fn navigation_timeout_still_extracts() {
        let mut script = rendered_issue();
        script.navigation_times_out = true;
        let automation = Arc::new(ScriptedAutomation::new(script));

        let record = strategy(automation.clone()).acquire("9").await.unwrap();

        assert!(record.title.is_some());
        assert_eq!(automation.counters.closed(), 1);
    }

    #[tokio::test]
    async fn session_is_released_when_navigation_fails() {
        let mut script = rendered_issue();
        script.navigation_fails = true;
        let automation = Arc::new(ScriptedAutomation::new(script));

        let result = strategy(automation.clone()).acquire("9").await;

        assert!(matches!(result, Err(StrategyError::Browser(_))));
        assert_eq!(automation.counters.opened(), 1);
        assert_eq!(automation.counters.closed(), 1);
        assert_eq!(automation.counters.aborted(), 0);
    }

    #[tokio::test]
    async fn blank_page_is_no_data() {
        let automation = Arc::new(ScriptedAutomation::new(PageScript::default()));
        let result = strategy(automation.clone()).acquire("9").await;

        assert!(matches!(result, Err(StrategyError::NoData)));
        assert_eq!(automation.counters.closed(), 1);
    }
}
