//! Tagged field tuple decoder.

use super::wrapper::{read_wrapper, TypedValue, WrapperKind};
use crate::model::{IssueType, PartialRecord, Priority, SchemaDrift, Severity, Status};
use serde_json::Value;
use tracing::debug;

/// Guards against pathological nesting; upstream bodies are far shallower.
const MAX_DEPTH: usize = 128;

/// How many array levels below a tuple element a wrapper may sit.
const WRAPPER_SEARCH_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Status,
    Priority,
    Type,
    Severity,
    Reporter,
    Assignee,
    Created,
    Modified,
}

/// Field name -> (field, wrapper kind the value must arrive in).
const FIELD_TABLE: &[(&str, Field, WrapperKind)] = &[
    ("title", Field::Title, WrapperKind::StringValue),
    ("status", Field::Status, WrapperKind::Int32Value),
    ("priority", Field::Priority, WrapperKind::Int32Value),
    ("type", Field::Type, WrapperKind::Int32Value),
    ("severity", Field::Severity, WrapperKind::Int32Value),
    ("reporter", Field::Reporter, WrapperKind::UserRef),
    ("assignee", Field::Assignee, WrapperKind::UserRef),
    ("created", Field::Created, WrapperKind::Timestamp),
    ("modified", Field::Modified, WrapperKind::Timestamp),
];

/// Extracts metadata fields from an arbitrary upstream tree.
///
/// The first occurrence of a field in document order wins. Nodes that do not
/// match the tuple and wrapper shapes are skipped, so the decoder never fails;
/// wrappers that are tagged with a known field but carry an unexpected or
/// unrecognized value are reported as [`SchemaDrift`].
#[must_use]
pub fn decode_metadata(node: &Value) -> PartialRecord {
    let mut record = PartialRecord::default();
    walk(node, &mut record, 0);
    record
}

fn walk(node: &Value, record: &mut PartialRecord, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    match node {
        Value::Array(items) => {
            if let Some((name, field, expected, value)) = match_tuple(items) {
                apply(record, name, field, expected, value);
                return;
            }
            for item in items {
                walk(item, record, depth + 1);
            }
        }
        Value::Object(map) => {
            for value in map.values() {
                walk(value, record, depth + 1);
            }
        }
        _ => {}
    }
}

fn match_tuple(items: &[Value]) -> Option<(&str, Field, WrapperKind, TypedValue<'_>)> {
    if !(2..=3).contains(&items.len()) {
        return None;
    }
    let name = items[0].as_str()?;
    let (name, field, expected) = FIELD_TABLE
        .iter()
        .find(|(known, _, _)| *known == name)
        .copied()?;
    let value = items[1..]
        .iter()
        .find_map(|item| find_wrapper(item, WRAPPER_SEARCH_DEPTH))?;
    Some((name, field, expected, value))
}

fn find_wrapper(node: &Value, depth: usize) -> Option<TypedValue<'_>> {
    if let Some(value) = read_wrapper(node) {
        return Some(value);
    }
    if depth == 0 {
        return None;
    }
    node.as_array()?
        .iter()
        .find_map(|child| find_wrapper(child, depth - 1))
}

fn apply(
    record: &mut PartialRecord,
    name: &str,
    field: Field,
    expected: WrapperKind,
    value: TypedValue<'_>,
) {
    if value.kind() != Some(expected) {
        debug!(field = name, found = %value.describe(), "Unexpected value wrapper");
        record.schema_drift.push(SchemaDrift {
            field: name.to_string(),
            found: value.describe(),
        });
        return;
    }

    match (field, value) {
        (Field::Title, TypedValue::StringValue(title)) => {
            let title = title.trim();
            if !title.is_empty() {
                set_once(&mut record.title, title.to_string());
            }
        }
        (Field::Status, TypedValue::Int32Value(code)) => {
            set_once(&mut record.status, Status::from_code(code));
        }
        (Field::Priority, TypedValue::Int32Value(code)) => {
            set_once(&mut record.priority, Priority::from_code(code));
        }
        (Field::Type, TypedValue::Int32Value(code)) => {
            set_once(&mut record.issue_type, IssueType::from_code(code));
        }
        (Field::Severity, TypedValue::Int32Value(code)) => {
            set_once(&mut record.severity, Severity::from_code(code));
        }
        (Field::Reporter, TypedValue::UserRef(email)) => {
            set_once(&mut record.reporter, email.to_string());
        }
        (Field::Assignee, TypedValue::UserRef(email)) => {
            set_once(&mut record.assignee, email.to_string());
        }
        (Field::Created, TypedValue::Timestamp(instant)) => {
            set_once(&mut record.created, instant);
        }
        (Field::Modified, TypedValue::Timestamp(instant)) => {
            set_once(&mut record.modified, instant);
        }
        _ => {}
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}
