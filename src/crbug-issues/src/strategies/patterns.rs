//! Field patterns matched against rendered page text.
//!
//! Rendered pages show metadata as label/value pairs (`Priority P2`,
//! `Reporter dev@chromium.org`). These patterns recover what the DOM
//! selectors and embedded data missed.

use crate::cross_refs::extract_change_ids;
use crate::model::{IssueType, PartialRecord, Priority, Severity, Status};
use once_cell::sync::Lazy;
use regex::Regex;

static PRIORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bPriority\s*:?\s*P([0-4])\b").expect("valid priority regex"));

static SEVERITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bSeverity\s*:?\s*S([0-4])\b").expect("valid severity regex"));

static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bType\s*:?\s*(Bug|Feature|Task)\b").expect("valid type regex")
});

static STATUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bStatus\s*:?\s*([A-Za-z]+)\b").expect("valid status regex"));

const EMAIL: &str = r"([A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,})";

static REPORTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bReporter\s*:?\s*{EMAIL}")).expect("valid reporter regex")
});

static ASSIGNEE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bAssignee\s*:?\s*{EMAIL}")).expect("valid assignee regex")
});

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

fn parse_code(digit: &str) -> Option<i64> {
    digit.parse().ok()
}

/// Scans page text for labelled metadata and change references.
#[must_use]
pub fn scan_page_text(text: &str) -> PartialRecord {
    PartialRecord {
        priority: first_capture(&PRIORITY_RE, text)
            .and_then(parse_code)
            .map(Priority::from_code),
        severity: first_capture(&SEVERITY_RE, text)
            .and_then(parse_code)
            .map(Severity::from_code),
        issue_type: first_capture(&TYPE_RE, text).and_then(IssueType::from_label),
        status: STATUS_RE
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .find_map(|m| Status::from_label(m.as_str())),
        reporter: first_capture(&REPORTER_RE, text).map(str::to_string),
        assignee: first_capture(&ASSIGNEE_RE, text).map(str::to_string),
        related_change_ids: extract_change_ids(text),
        ..Default::default()
    }
}
