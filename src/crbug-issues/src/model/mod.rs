//! Issue records produced by the reconstruction engine.
//!
//! - [`PartialRecord`] - what one acquisition strategy managed to extract
//! - [`Issue`] - the canonical record merged from every partial record
//! - [`Comment`] - a cleaned comment body with its author and timestamp

mod codes;

pub use codes::{IssueType, Priority, Severity, Status, UNSET_LABEL};

use serde::Serialize;

/// A single cleaned comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Comment author, usually an email address.
    pub author: String,

    /// ISO-8601 instant, when the upstream entry carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Plain text content, markup stripped and whitespace normalized.
    pub content: String,
}

/// Strategy that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Structured JSON endpoints.
    Direct,
    /// Plain HTTP fetch of the rendered issue page.
    PageFetch,
    /// Browser-rendered DOM scraping.
    BrowserAutomation,
}

impl Provenance {
    /// Returns the provenance tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::PageFetch => "page-fetch",
            Self::BrowserAutomation => "browser-automation",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upstream value whose shape did not match what the decoder expected.
///
/// These are reported rather than dropped so that schema changes upstream
/// show up in the output without breaking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDrift {
    /// Field name the value was tagged with.
    pub field: String,

    /// Short description of what was found instead.
    pub found: String,
}

/// Fields extracted by a single acquisition strategy.
///
/// Every field is optional. Enumerations are only set when a source reported
/// a code for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRecord {
    pub title: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub issue_type: Option<IssueType>,
    pub severity: Option<Severity>,
    pub reporter: Option<String>,
    pub assignee: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub description: Option<String>,
    pub comments: Vec<Comment>,
    pub related_change_ids: Vec<String>,
    pub schema_drift: Vec<SchemaDrift>,
}

impl PartialRecord {
    /// Returns true when no usable field was extracted.
    ///
    /// Schema drift entries are diagnostics and do not count as fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.issue_type.is_none()
            && self.severity.is_none()
            && self.reporter.is_none()
            && self.assignee.is_none()
            && self.created.is_none()
            && self.modified.is_none()
            && self.description.is_none()
            && self.comments.is_empty()
            && self.related_change_ids.is_empty()
    }

    /// Fills fields that are still missing from another record of the same
    /// strategy. Comments, change ids and drift entries are appended.
    pub fn fill_from(&mut self, other: PartialRecord) {
        fill(&mut self.title, other.title);
        fill(&mut self.status, other.status);
        fill(&mut self.priority, other.priority);
        fill(&mut self.issue_type, other.issue_type);
        fill(&mut self.severity, other.severity);
        fill(&mut self.reporter, other.reporter);
        fill(&mut self.assignee, other.assignee);
        fill(&mut self.created, other.created);
        fill(&mut self.modified, other.modified);
        fill(&mut self.description, other.description);
        self.comments.extend(other.comments);
        self.related_change_ids.extend(other.related_change_ids);
        self.schema_drift.extend(other.schema_drift);
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// The canonical issue record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Upstream-assigned identifier.
    pub id: String,
    pub title: Option<String>,
    pub status: Status,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub reporter: Option<String>,
    pub assignee: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub description: Option<String>,
    /// Comments in discovery order across all sources.
    pub comments: Vec<Comment>,
    /// Referenced change ids, duplicate free, in discovery order.
    pub related_change_ids: Vec<String>,
    /// Last strategy that contributed usable fields.
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schema_drift: Vec<SchemaDrift>,
}
