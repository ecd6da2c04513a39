//! Issue rows of a list/search response.

use super::timestamp_from_slot;
use super::wrapper::{as_integer, read_wrapper, TypedValue};
use crate::model::{IssueType, Priority, Severity, Status};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Issue ids are far larger than the small indices used elsewhere in list
/// responses; rows whose id slot exceeds this are treated as issues.
pub const ISSUE_ID_THRESHOLD: f64 = 1_000_000.0;

const ID_SLOT: usize = 1;
const DETAILS_SLOT: usize = 2;
const MODIFIED_SLOT: usize = 4;

const STATUS_OFFSET: usize = 1;
const PRIORITY_OFFSET: usize = 2;
const TYPE_OFFSET: usize = 3;
const SEVERITY_OFFSET: usize = 4;
const TITLE_OFFSET: usize = 5;
const REPORTER_OFFSET: usize = 6;
const ASSIGNEE_OFFSET: usize = 7;

const MAX_DEPTH: usize = 128;

/// A lightweight issue row from a search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub issue_type: Option<IssueType>,
    pub severity: Option<Severity>,
    pub reporter: Option<String>,
    pub assignee: Option<String>,
    pub modified: Option<String>,
}

/// Returns true when a sub-array looks like an issue row.
#[must_use]
pub fn is_issue_candidate(items: &[Value]) -> bool {
    items
        .get(ID_SLOT)
        .and_then(Value::as_f64)
        .is_some_and(|id| id > ISSUE_ID_THRESHOLD)
}

/// Extracts every issue row from a search response, deduplicated by id.
#[must_use]
pub fn decode_search_results(node: &Value) -> Vec<IssueSummary> {
    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    collect_rows(node, &mut rows, &mut seen, 0);
    rows
}

fn collect_rows(
    node: &Value,
    rows: &mut Vec<IssueSummary>,
    seen: &mut HashSet<String>,
    depth: usize,
) {
    if depth > MAX_DEPTH {
        return;
    }
    let Some(items) = node.as_array() else {
        return;
    };
    if is_issue_candidate(items) {
        if let Some(row) = decode_row(items) {
            if seen.insert(row.id.clone()) {
                rows.push(row);
            }
        }
        return;
    }
    for item in items {
        collect_rows(item, rows, seen, depth + 1);
    }
}

fn decode_row(items: &[Value]) -> Option<IssueSummary> {
    let id = as_integer(items.get(ID_SLOT)?)?.to_string();
    let details = items
        .get(DETAILS_SLOT)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let code = |offset: usize| details.get(offset).and_then(as_integer);

    Some(IssueSummary {
        id,
        title: details
            .get(TITLE_OFFSET)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string),
        status: code(STATUS_OFFSET).map(Status::from_code),
        priority: code(PRIORITY_OFFSET).map(Priority::from_code),
        issue_type: code(TYPE_OFFSET).map(IssueType::from_code),
        severity: code(SEVERITY_OFFSET).map(Severity::from_code),
        reporter: details.get(REPORTER_OFFSET).and_then(read_user),
        assignee: details.get(ASSIGNEE_OFFSET).and_then(read_user),
        modified: items.get(MODIFIED_SLOT).and_then(timestamp_from_slot),
    })
}

/// Reads a user slot: a bare string, a one-element array or a user wrapper.
fn read_user(node: &Value) -> Option<String> {
    let email = match node {
        Value::String(email) => email.as_str(),
        Value::Array(items) if items.len() == 1 => items[0].as_str()?,
        _ => match read_wrapper(node)? {
            TypedValue::UserRef(email) => email,
            _ => return None,
        },
    };
    let email = email.trim();
    (!email.is_empty()).then(|| email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_by_id_magnitude() {
        assert!(is_issue_candidate(&[json!(null), json!(1493929)]));
        assert!(!is_issue_candidate(&[json!(null), json!(42)]));
        assert!(!is_issue_candidate(&[json!(null), json!("1493929")]));
        assert!(!is_issue_candidate(&[json!(1493929)]));
    }

    #[test]
    fn can_decode_search_rows() {
        let node = json!([[
            "b.ListIssuesResponse",
            [
                [null, 42, ["not an issue"]],
                [
                    null,
                    1493929,
                    [null, 1, 2, 1, 3, "Crash in compositor", "reporter@chromium.org", ["owner@chromium.org"]],
                    null,
                    [1714557600, 0]
                ],
                [null, 40063133, [null, 42, null, 9, null, "  ", [null, ["issuetracker.User", [null, "r@chromium.org"]]]]],
                [null, 1493929, [null, 4]]
            ]
        ]]);

        let rows = decode_search_results(&node);

        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.id, "1493929");
        assert_eq!(first.title.as_deref(), Some("Crash in compositor"));
        assert_eq!(first.status, Some(Status::New));
        assert_eq!(first.priority, Some(Priority::P2));
        assert_eq!(first.issue_type, Some(IssueType::Bug));
        assert_eq!(first.severity, Some(Severity::S3));
        assert_eq!(first.reporter.as_deref(), Some("reporter@chromium.org"));
        assert_eq!(first.assignee.as_deref(), Some("owner@chromium.org"));
        assert_eq!(first.modified.as_deref(), Some("2024-05-01T10:00:00.000Z"));

        let second = &rows[1];
        assert_eq!(second.id, "40063133");
        assert_eq!(second.title, None);
        assert_eq!(second.status.map(|s| s.label().into_owned()), Some("Status42".to_string()));
        assert_eq!(second.priority, None);
        assert_eq!(second.issue_type, Some(IssueType::Unknown(9)));
        assert_eq!(second.reporter.as_deref(), Some("r@chromium.org"));
        assert_eq!(second.assignee, None);
    }
}
