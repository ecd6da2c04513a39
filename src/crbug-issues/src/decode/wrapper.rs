//! Type-tagged value wrappers.
//!
//! Upstream encodes typed values as `[null, [tag, values]]` where `tag` names
//! the protobuf message type and `values` holds its fields by position.

use serde_json::Value;

/// Marker inside a string wrapper tag.
pub const STRING_VALUE_MARKER: &str = "StringValue";
/// Marker inside a 32-bit integer wrapper tag.
pub const INT32_VALUE_MARKER: &str = "Int32Value";
/// Marker inside a timestamp wrapper tag.
pub const TIMESTAMP_MARKER: &str = "Timestamp";
/// Marker inside a user record wrapper tag.
pub const USER_MARKER: &str = "User";

/// Position of the email address inside a user record.
const USER_EMAIL_SLOT: usize = 1;

/// Wrapper kinds the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKind {
    StringValue,
    Int32Value,
    Timestamp,
    UserRef,
}

impl WrapperKind {
    /// Classifies a wrapper tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.contains(STRING_VALUE_MARKER) {
            Some(Self::StringValue)
        } else if tag.contains(INT32_VALUE_MARKER) {
            Some(Self::Int32Value)
        } else if tag.contains(TIMESTAMP_MARKER) {
            Some(Self::Timestamp)
        } else if tag.contains(USER_MARKER) {
            Some(Self::UserRef)
        } else {
            None
        }
    }
}

/// A decoded wrapper payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue<'a> {
    StringValue(&'a str),
    Int32Value(i64),
    /// ISO-8601 instant.
    Timestamp(String),
    /// Email address of the referenced user.
    UserRef(&'a str),
    /// Unknown tag, or a known tag whose payload was unusable.
    Unrecognized { tag: &'a str },
}

impl TypedValue<'_> {
    /// Returns the wrapper kind, `None` for unrecognized wrappers.
    #[must_use]
    pub fn kind(&self) -> Option<WrapperKind> {
        match self {
            Self::StringValue(_) => Some(WrapperKind::StringValue),
            Self::Int32Value(_) => Some(WrapperKind::Int32Value),
            Self::Timestamp(_) => Some(WrapperKind::Timestamp),
            Self::UserRef(_) => Some(WrapperKind::UserRef),
            Self::Unrecognized { .. } => None,
        }
    }

    /// Short description used in drift diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::StringValue(_) => "string value".to_string(),
            Self::Int32Value(_) => "int32 value".to_string(),
            Self::Timestamp(_) => "timestamp value".to_string(),
            Self::UserRef(_) => "user value".to_string(),
            Self::Unrecognized { tag } => format!("unrecognized wrapper '{tag}'"),
        }
    }
}

/// Reads a wrapper from a node, returning `None` when the node does not have
/// the wrapper shape at all.
#[must_use]
pub fn read_wrapper(node: &Value) -> Option<TypedValue<'_>> {
    let outer = node.as_array()?;
    if outer.len() < 2 || !outer[0].is_null() {
        return None;
    }
    let inner = outer[1].as_array()?;
    let tag = inner.first()?.as_str()?;
    let values = inner.get(1).and_then(Value::as_array);

    let decoded = match (WrapperKind::from_tag(tag), values) {
        (Some(WrapperKind::StringValue), Some(values)) => values
            .first()
            .and_then(Value::as_str)
            .map(TypedValue::StringValue),
        (Some(WrapperKind::Int32Value), Some(values)) => {
            values.first().and_then(as_integer).map(TypedValue::Int32Value)
        }
        (Some(WrapperKind::Timestamp), Some(values)) => {
            super::timestamp_from_parts(values).map(TypedValue::Timestamp)
        }
        (Some(WrapperKind::UserRef), Some(values)) => values
            .get(USER_EMAIL_SLOT)
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .map(TypedValue::UserRef),
        _ => None,
    };

    Some(decoded.unwrap_or(TypedValue::Unrecognized { tag }))
}

/// Reads an integer from a number or a numeric string.
pub(crate) fn as_integer(node: &Value) -> Option<i64> {
    match node {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn can_read_string_wrapper() {
        let node = json!([null, ["type.googleapis.com/google.protobuf.StringValue", ["Crash"]]]);
        assert_eq!(read_wrapper(&node), Some(TypedValue::StringValue("Crash")));
    }

    #[test]
    fn can_read_int32_wrapper_from_string() {
        let node = json!([null, ["google.protobuf.Int32Value", ["4"]]]);
        assert_eq!(read_wrapper(&node), Some(TypedValue::Int32Value(4)));
    }

    #[test]
    fn can_read_user_wrapper() {
        let node = json!([null, ["issuetracker.User", [null, "dev@chromium.org", 1]]]);
        assert_eq!(read_wrapper(&node), Some(TypedValue::UserRef("dev@chromium.org")));
    }

    #[test]
    fn can_read_timestamp_wrapper() {
        let node = json!([null, ["google.protobuf.Timestamp", [1714557600, 0]]]);
        assert_eq!(
            read_wrapper(&node),
            Some(TypedValue::Timestamp("2024-05-01T10:00:00.000Z".to_string()))
        );
    }

    #[test]
    fn unknown_tag_is_unrecognized() {
        let node = json!([null, ["google.protobuf.FloatValue", [1.5]]]);
        assert_eq!(
            read_wrapper(&node),
            Some(TypedValue::Unrecognized {
                tag: "google.protobuf.FloatValue"
            })
        );
    }

    #[test]
    fn non_wrapper_shape_is_none() {
        assert_eq!(read_wrapper(&json!(["title", "x"])), None);
        assert_eq!(read_wrapper(&json!([1, ["tag", []]])), None);
        assert_eq!(read_wrapper(&json!(null)), None);
    }
}
