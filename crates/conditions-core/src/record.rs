//! Persistence records for primary conditions
//!
//! A store saves and loads a flat, ordered list of records, each a key plus
//! an optional value. How the list is encoded is up to the caller; records
//! derive serde traits so any serde format will do.

use serde::{Deserialize, Serialize};

/// Value applied when a loaded record carries no explicit value
pub const IMPLICIT_VALUE: i64 = 1;

/// A single saved condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    /// The condition key
    pub key: String,
    /// The stored value, omitted when it is [`IMPLICIT_VALUE`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

impl ConditionRecord {
    /// Create a bare record that loads as [`IMPLICIT_VALUE`]
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Create a record with an explicit value
    pub fn with_value(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
        }
    }

    /// Build the record a primary condition saves as
    ///
    /// Zero-valued conditions are not saved, since loading nothing leaves
    /// them at zero anyway.
    pub fn from_primary(key: &str, value: i64) -> Option<Self> {
        match value {
            0 => None,
            IMPLICIT_VALUE => Some(Self::flag(key)),
            _ => Some(Self::with_value(key, value)),
        }
    }

    /// The value this record loads as
    pub fn load_value(&self) -> i64 {
        self.value.unwrap_or(IMPLICIT_VALUE)
    }
}

impl From<(String, Option<i64>)> for ConditionRecord {
    fn from((key, value): (String, Option<i64>)) -> Self {
        Self { key, value }
    }
}

impl From<(&str, Option<i64>)> for ConditionRecord {
    fn from((key, value): (&str, Option<i64>)) -> Self {
        Self {
            key: key.to_owned(),
            value,
        }
    }
}
