//! Decoders for the tracker's schema-less wire format.
//!
//! Responses are nested JSON arrays with no field names. Values are found by
//! position and by type-tag strings embedded in the arrays:
//! - [`decode_metadata`] - tagged field tuples (title, status, people, ...)
//! - [`parse_events`] / [`parse_comments_batch`] - comment entries
//! - [`decode_search_results`] - issue rows of a list query

mod comments;
mod error;
mod metadata;
mod search;
pub mod text;
mod wrapper;

pub use comments::{
    parse_comment_entry, parse_comments_batch, parse_events, COMMENTS_BATCH_RESPONSE_TAG,
    EVENTS_RESPONSE_TAG,
};
pub use error::DecodeError;
pub use metadata::decode_metadata;
pub use search::{decode_search_results, is_issue_candidate, IssueSummary, ISSUE_ID_THRESHOLD};
pub use wrapper::{read_wrapper, TypedValue, WrapperKind};

use crate::model::PartialRecord;
use chrono::{DateTime, SecondsFormat};
use serde_json::Value;

/// Prefix the tracker puts in front of JSON bodies to block script inclusion.
pub const ANTI_HIJACKING_PREFIX: &str = ")]}'";

/// Removes the anti-hijacking prefix and its line terminator, if present.
#[must_use]
pub fn strip_envelope(body: &str) -> &str {
    let trimmed = body.trim_start_matches('\u{feff}').trim_start();
    match trimmed.strip_prefix(ANTI_HIJACKING_PREFIX) {
        Some(rest) => rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest),
        None => trimmed,
    }
}

/// Parses a response body in either prefixed or bare form.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is empty or not JSON.
pub fn parse_body(body: &str) -> Result<Value, DecodeError> {
    let json = strip_envelope(body);
    if json.trim().is_empty() {
        return Err(DecodeError::EmptyBody);
    }
    Ok(serde_json::from_str(json)?)
}

/// Runs every single-issue decoder over one parsed response.
///
/// Metadata tuples, event entries and comment batches may all appear in the
/// same body; each decoder only picks up the shapes it recognizes.
#[must_use]
pub fn decode_response(node: &Value) -> PartialRecord {
    let mut record = decode_metadata(node);
    record.comments.extend(parse_events(node));
    record.comments.extend(parse_comments_batch(node));
    record
}

/// Converts a `[seconds, nanos]` slot to an ISO-8601 instant.
pub(crate) fn timestamp_from_slot(node: &Value) -> Option<String> {
    timestamp_from_parts(node.as_array()?)
}

pub(crate) fn timestamp_from_parts(parts: &[Value]) -> Option<String> {
    let seconds = parts.first().and_then(wrapper::as_integer)?;
    let nanos = parts
        .get(1)
        .and_then(wrapper::as_integer)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n < 1_000_000_000)
        .unwrap_or(0);
    DateTime::from_timestamp(seconds, nanos)
        .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn can_strip_prefixed_body() {
        assert_eq!(strip_envelope(")]}'\n[1,2]"), "[1,2]");
        assert_eq!(strip_envelope(")]}'\r\n[1]"), "[1]");
        assert_eq!(strip_envelope("[1]"), "[1]");
    }

    #[test]
    fn parse_body_accepts_both_forms() {
        assert_eq!(parse_body(")]}'\n[\"a\"]").unwrap(), json!(["a"]));
        assert_eq!(parse_body("[\"a\"]").unwrap(), json!(["a"]));
    }

    #[test]
    fn parse_body_reports_errors() {
        assert!(matches!(parse_body(")]}'\n"), Err(DecodeError::EmptyBody)));
        assert!(matches!(parse_body("<html>"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn can_convert_timestamp_slot() {
        assert_eq!(
            timestamp_from_slot(&json!([1714557600, 250000000])),
            Some("2024-05-01T10:00:00.250Z".to_string())
        );
        assert_eq!(
            timestamp_from_slot(&json!([1714557600])),
            Some("2024-05-01T10:00:00.000Z".to_string())
        );
        assert_eq!(timestamp_from_slot(&json!(["soon", 0])), None);
        assert_eq!(timestamp_from_slot(&json!(12)), None);
    }
}
