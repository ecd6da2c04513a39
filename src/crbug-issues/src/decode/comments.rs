//! Comment extraction from the events feed and the comments batch endpoint.
//!
//! Both envelopes carry entries with the same positional layout:
//! `[author, [seconds, nanos], content, ...]`.

use super::text::{clean_content, is_migration_artifact, is_substantive};
use super::timestamp_from_slot;
use crate::model::Comment;
use serde_json::Value;
use tracing::debug;

/// Type tag leading an events feed response.
pub const EVENTS_RESPONSE_TAG: &str = "ListIssueEventsResponse";

/// Type tag leading a comments batch response.
pub const COMMENTS_BATCH_RESPONSE_TAG: &str = "BatchGetIssueCommentsResponse";

const AUTHOR_SLOT: usize = 0;
const TIMESTAMP_SLOT: usize = 1;
const CONTENT_SLOT: usize = 2;

const UNKNOWN_AUTHOR: &str = "unknown";

const MAX_DEPTH: usize = 128;

/// Extracts comments from an events feed response.
#[must_use]
pub fn parse_events(node: &Value) -> Vec<Comment> {
    parse_enveloped(node, EVENTS_RESPONSE_TAG)
}

/// Extracts comments from a comments batch response.
#[must_use]
pub fn parse_comments_batch(node: &Value) -> Vec<Comment> {
    parse_enveloped(node, COMMENTS_BATCH_RESPONSE_TAG)
}

fn parse_enveloped(node: &Value, tag: &str) -> Vec<Comment> {
    let Some(entries) = find_payload(node, tag, 0) else {
        return Vec::new();
    };
    let comments: Vec<Comment> = entries.iter().filter_map(parse_comment_entry).collect();
    debug!(
        envelope = tag,
        entries = entries.len(),
        accepted = comments.len(),
        "Parsed comment entries"
    );
    comments
}

/// Finds the entry array that follows the envelope tag.
fn find_payload<'a>(node: &'a Value, tag: &str, depth: usize) -> Option<&'a [Value]> {
    if depth > MAX_DEPTH {
        return None;
    }
    let items = node.as_array()?;
    if items
        .first()
        .and_then(Value::as_str)
        .is_some_and(|leading| leading.contains(tag))
    {
        return items[1..]
            .iter()
            .find_map(Value::as_array)
            .map(Vec::as_slice);
    }
    items
        .iter()
        .find_map(|child| find_payload(child, tag, depth + 1))
}

/// Interprets one positional entry as a comment.
///
/// Returns `None` for structural noise (short content) and for migration
/// placeholder comments.
#[must_use]
pub fn parse_comment_entry(entry: &Value) -> Option<Comment> {
    let slots = entry.as_array()?;
    let raw = slots.get(CONTENT_SLOT).map(flatten_text)?;
    let content = clean_content(&raw);

    if !is_substantive(&content) {
        return None;
    }
    if is_migration_artifact(&content) {
        debug!("Dropping migration placeholder comment");
        return None;
    }

    let author = slots
        .get(AUTHOR_SLOT)
        .and_then(read_author)
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();
    let timestamp = slots.get(TIMESTAMP_SLOT).and_then(timestamp_from_slot);

    Some(Comment {
        author,
        timestamp,
        content,
    })
}

fn read_author(node: &Value) -> Option<&str> {
    let author = match node {
        Value::String(author) => author.as_str(),
        Value::Array(items) if items.len() == 1 => items[0].as_str()?,
        _ => return None,
    };
    let author = author.trim();
    (!author.is_empty()).then_some(author)
}

/// Concatenates every string leaf, in encounter order, separated by spaces.
fn flatten_text(node: &Value) -> String {
    match node {
        Value::String(text) => text.clone(),
        Value::Array(_) => {
            let mut leaves = Vec::new();
            collect_strings(node, &mut leaves, 0);
            leaves.join(" ")
        }
        _ => String::new(),
    }
}

fn collect_strings<'a>(node: &'a Value, leaves: &mut Vec<&'a str>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    match node {
        Value::String(text) => leaves.push(text),
        Value::Array(items) => {
            for item in items {
                collect_strings(item, leaves, depth + 1);
            }
        }
        _ => {}
    }
}
