//! Record and ownership types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One row of an entity collection.
///
/// The value domain is null, boolean, number, string, nested mapping and
/// homogeneous sequence. Field order is preserved.
pub type Record = serde_json::Map<String, Value>;

/// Identifier of the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Row visibility of an entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Rows are filtered by the acting user's ownership key.
    Owned,
    /// Rows are visible and writable by every authenticated user.
    Shared,
}

impl Scope {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the upsert key of a record, if its id field holds a usable scalar.
///
/// Numeric and string ids are both accepted; `1` and `"1"` map to the same key.
#[must_use]
pub fn record_id_key(record: &Record, id_field: &str) -> Option<String> {
    match record.get(id_field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
