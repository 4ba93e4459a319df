//! Golden file tests for export documents.
//!
//! Pins the exact bytes of both export formats so that files written by
//! one release stay readable by the next:
//! - JSON layout (key order, two-space indent)
//! - XML layout (declaration, no indentation, entity escaping)
//! - Golden files decode back to the same envelope

// Golden tests use expect/unwrap/panic for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use chrono::{TimeZone, Utc};
use lifeos::io::Format;
use lifeos::{ExportEnvelope, Record};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Get the path to the golden files directory.
fn golden_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("golden")
}

/// Load a golden file as a string.
fn load_golden(filename: &str) -> String {
    let path = golden_dir().join(filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read golden file {}: {e}", path.display()))
}

fn categories_envelope() -> ExportEnvelope {
    let records: Vec<Record> = [
        json!({"id": 1, "name": "Work", "user_id": "u1"}),
        json!({"id": 2, "name": "Home & <Garden>", "user_id": "u1"}),
    ]
    .into_iter()
    .map(|v| v.as_object().cloned().unwrap())
    .collect();

    let mut data = BTreeMap::new();
    data.insert("task_categories".to_string(), records);
    let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
    ExportEnvelope::at("task_categories", data, at)
}

#[test]
fn test_json_matches_golden() {
    let encoded = Format::Json.codec().encode(&categories_envelope()).unwrap();
    assert_eq!(encoded, load_golden("task_categories.json").trim_end());
}

#[test]
fn test_xml_matches_golden() {
    let encoded = Format::Xml.codec().encode(&categories_envelope()).unwrap();
    assert_eq!(encoded, load_golden("task_categories.xml").trim_end());
}

#[test]
fn test_golden_files_decode_to_envelope() {
    for (format, file) in [
        (Format::Json, "task_categories.json"),
        (Format::Xml, "task_categories.xml"),
    ] {
        let content = load_golden(file);
        assert_eq!(Format::sniff(&content), format, "{file}");
        let decoded = format.codec().decode(&content).unwrap();
        assert_eq!(decoded, categories_envelope(), "{file}");
    }
}
