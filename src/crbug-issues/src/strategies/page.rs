//! Plain HTTP fetch of the rendered issue page.

use super::patterns::scan_page_text;
use super::{non_empty, AcquisitionStrategy, StrategyError};
use crate::decode::decode_response;
use crate::decode::text::{clean_content, decode_entities};
use crate::model::{PartialRecord, Provenance};
use crate::transport::{Endpoints, Upstream};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));

static META_DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\s+[^>]*(?:name|property)\s*=\s*["'](?:og:)?description["'][^>]*>"#)
        .expect("valid meta regex")
});

static META_CONTENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\bcontent\s*=\s*"([^"]*)"|\bcontent\s*=\s*'([^']*)'"#)
        .expect("valid content regex")
});

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("valid script regex"));

static BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("valid body regex"));

/// Site name suffixes appended to page titles.
const TITLE_SUFFIXES: &[&str] = &[" - Chromium", " - Issue Tracker", " - IssueTracker"];

/// Page titles that only name the site.
const SITE_TITLES: &[&str] = &["Issue Tracker", "IssueTracker", "Chromium"];

/// Fetches `/issues/{id}` and reads the HTML title, meta description,
/// JSON arrays embedded in inline scripts and labelled fields in the text.
pub struct PageFetchStrategy {
    upstream: Arc<dyn Upstream>,
    endpoints: Endpoints,
}

impl PageFetchStrategy {
    #[must_use]
    pub fn new(upstream: Arc<dyn Upstream>, endpoints: Endpoints) -> Self {
        Self {
            upstream,
            endpoints,
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for PageFetchStrategy {
    fn name(&self) -> &'static str {
        "page-fetch"
    }

    fn kind(&self) -> Provenance {
        Provenance::PageFetch
    }

    async fn acquire(&self, issue_id: &str) -> Result<PartialRecord, StrategyError> {
        let url = self.endpoints.issue_page(issue_id);
        let html = self.upstream.get_text(&url).await?;
        debug!(url = %url, bytes = html.len(), "Fetched issue page");
        non_empty(extract_from_html(&html))
    }
}

/// Extracts a partial record from an issue page.
///
/// Embedded data takes precedence over the HTML head, which takes precedence
/// over text patterns.
#[must_use]
pub fn extract_from_html(html: &str) -> PartialRecord {
    let mut record = PartialRecord::default();

    for script in SCRIPT_RE.captures_iter(html).filter_map(|c| c.get(1)) {
        for node in embedded_arrays(script.as_str()) {
            let decoded = decode_response(&node);
            if !decoded.is_empty() || !decoded.schema_drift.is_empty() {
                record.fill_from(decoded);
            }
        }
    }

    record.fill_from(PartialRecord {
        title: page_title(html),
        description: meta_description(html),
        ..Default::default()
    });

    let body = BODY_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or(html, |m| m.as_str());
    let text = clean_content(&SCRIPT_RE.replace_all(body, ""));
    record.fill_from(scan_page_text(&text));
    record
}

fn page_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let mut title = clean_content(raw).replace('\n', " ");
    for suffix in TITLE_SUFFIXES {
        if let Some(stripped) = title.strip_suffix(suffix) {
            title = stripped.to_string();
        }
    }
    let title = title.trim();
    (!title.is_empty() && !SITE_TITLES.contains(&title)).then(|| title.to_string())
}

fn meta_description(html: &str) -> Option<String> {
    META_DESCRIPTION_RE.find_iter(html).find_map(|tag| {
        let captures = META_CONTENT_RE.captures(tag.as_str())?;
        let content = captures.get(1).or_else(|| captures.get(2))?.as_str();
        let content = decode_entities(content).trim().to_string();
        (!content.is_empty()).then_some(content)
    })
}

/// Parses every top-level JSON array that starts inside `script`.
///
/// Inline data is usually wrapped in a call such as
/// `AF_initDataCallback({key: 'ds:1', data: [...]})`, so parsing starts at
/// each `[` and resumes after the parsed array, or after the point where a
/// failed parse gave up. Every byte is parsed at most once.
fn embedded_arrays(script: &str) -> Vec<Value> {
    let mut found = Vec::new();
    let mut offset = 0;
    while let Some(start) = script[offset..].find('[').map(|i| offset + i) {
        let rest = &script[start..];
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        let consumed = match stream.next() {
            Some(Ok(value @ Value::Array(_))) => {
                found.push(value);
                stream.byte_offset()
            }
            Some(Err(error)) => error_offset(rest, &error),
            _ => 1,
        };
        offset = ceil_char_boundary(script, start + consumed.max(1));
    }
    found
}

/// Byte offset in `text` of the position a parse error points at.
fn error_offset(text: &str, error: &serde_json::Error) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(error.line().saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + error.column()).min(text.len())
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index.min(text.len())
}
