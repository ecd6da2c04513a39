//! Closed code tables for the numeric enumerations used by the tracker.
//!
//! Every enumeration is total: codes missing from a table resolve to an
//! `Unknown(code)` variant whose label carries the raw code, and `Unset`
//! marks a field no source reported.

use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Label used for enumerations that no source reported.
pub const UNSET_LABEL: &str = "Unknown";

macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $name:ident, unknown_prefix = $prefix:literal, {
            $($code:literal => $variant:ident = $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $label, "` (code ", stringify!($code), ").")]
                $variant,
            )+
            /// A code that is missing from the table.
            Unknown(i64),
            /// No source reported this field.
            Unset,
        }

        impl $name {
            const TABLE: &'static [(i64, $name, &'static str)] = &[
                $(($code, $name::$variant, $label)),+
            ];

            /// Resolves a numeric code. Never fails.
            #[must_use]
            pub fn from_code(code: i64) -> Self {
                Self::TABLE
                    .iter()
                    .find(|(known, _, _)| *known == code)
                    .map_or(Self::Unknown(code), |(_, value, _)| *value)
            }

            /// Resolves a rendered label such as it appears on the issue page.
            #[must_use]
            pub fn from_label(label: &str) -> Option<Self> {
                let label = label.trim();
                Self::TABLE
                    .iter()
                    .find(|(_, _, known)| known.eq_ignore_ascii_case(label))
                    .map(|(_, value, _)| *value)
            }

            /// Returns the display label.
            #[must_use]
            pub fn label(&self) -> Cow<'static, str> {
                match self {
                    Self::Unknown(code) => Cow::Owned(format!("{}{code}", $prefix)),
                    Self::Unset => Cow::Borrowed(UNSET_LABEL),
                    known => Self::TABLE
                        .iter()
                        .find(|(_, value, _)| value == known)
                        .map_or(Cow::Borrowed(UNSET_LABEL), |(_, _, label)| {
                            Cow::Borrowed(*label)
                        }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.label())
            }
        }
    };
}

code_table! {
    /// Issue status.
    Status, unknown_prefix = "Status", {
        1 => New = "NEW",
        2 => Assigned = "ASSIGNED",
        3 => Accepted = "ACCEPTED",
        4 => Fixed = "FIXED",
        5 => Verified = "VERIFIED",
        6 => Invalid = "INVALID",
        7 => WontFix = "WONTFIX",
        8 => Duplicate = "DUPLICATE",
        9 => Archived = "ARCHIVED",
    }
}

code_table! {
    /// Issue priority.
    Priority, unknown_prefix = "Priority", {
        0 => P0 = "P0",
        1 => P1 = "P1",
        2 => P2 = "P2",
        3 => P3 = "P3",
        4 => P4 = "P4",
    }
}

code_table! {
    /// Issue type.
    IssueType, unknown_prefix = "Type", {
        1 => Bug = "Bug",
        2 => Feature = "Feature",
        3 => Task = "Task",
    }
}

code_table! {
    /// Issue severity.
    Severity, unknown_prefix = "Severity", {
        0 => S0 = "S0",
        1 => S1 = "S1",
        2 => S2 = "S2",
        3 => S3 = "S3",
        4 => S4 = "S4",
    }
}
