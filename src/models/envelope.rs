//! The export envelope.
//!
//! An envelope is the unit written to and read from export files: the preset
//! name, a timestamp, a format version and the per-collection records.

use super::Record;
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Version marker written into every envelope.
pub const FORMAT_VERSION: &str = "1.0";

/// Serialized export unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    /// Name of the preset that produced the envelope.
    pub export_type: String,
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
    /// Format version marker.
    pub version: String,
    /// Records keyed by collection name.
    pub data: BTreeMap<String, Vec<Record>>,
}

impl ExportEnvelope {
    /// Creates an envelope stamped with the current time.
    #[must_use]
    pub fn new(export_type: impl Into<String>, data: BTreeMap<String, Vec<Record>>) -> Self {
        Self::at(export_type, data, Utc::now())
    }

    /// Creates an envelope stamped with the given time.
    #[must_use]
    pub fn at(
        export_type: impl Into<String>,
        data: BTreeMap<String, Vec<Record>>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            export_type: export_type.into(),
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: FORMAT_VERSION.to_string(),
            data,
        }
    }

    /// Returns the total number of records across all collections.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    /// Builds an envelope from a decoded document tree.
    ///
    /// Both codecs funnel through here so the shape rules are identical:
    /// `exportType` and `data` must be present and non-null, `data` must map
    /// collection names to sequences of objects. A null collection is empty
    /// and a null entry inside a collection is an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFile`] when the tree does not have that shape.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(Error::InvalidFile(
                "expected an object at the top level".to_string(),
            ));
        };

        let export_type = root
            .remove("exportType")
            .as_ref()
            .and_then(scalar_text)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidFile("missing exportType".to_string()))?;

        let data = match root.remove("data") {
            Some(Value::Object(collections)) => collections
                .into_iter()
                .map(|(name, records)| {
                    let records = collection_records(&name, records)?;
                    Ok((name, records))
                })
                .collect::<Result<BTreeMap<_, _>>>()?,
            Some(Value::Null) | None => {
                return Err(Error::InvalidFile("missing data".to_string()));
            },
            Some(_) => {
                return Err(Error::InvalidFile(
                    "data must map collection names to records".to_string(),
                ));
            },
        };

        let exported_at = root
            .remove("exportedAt")
            .as_ref()
            .and_then(scalar_text)
            .unwrap_or_default();
        let version = root
            .remove("version")
            .as_ref()
            .and_then(scalar_text)
            .unwrap_or_else(|| FORMAT_VERSION.to_string());

        Ok(Self {
            export_type,
            exported_at,
            version,
            data,
        })
    }
}

/// Converts one collection's decoded value into records.
fn collection_records(name: &str, value: Value) -> Result<Vec<Record>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                Value::Null => Ok(Record::new()),
                _ => Err(Error::InvalidFile(format!(
                    "collection '{name}' contains a non-object record"
                ))),
            })
            .collect(),
        _ => Err(Error::InvalidFile(format!(
            "collection '{name}' must be a sequence of records"
        ))),
    }
}

/// Renders a scalar as text. The XML reader may have typed `1.0` as a number.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
