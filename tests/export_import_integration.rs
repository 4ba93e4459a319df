//! Integration tests for the export/import pipeline.
//!
//! Runs the services against an in-memory `SQLite` store and a scripted
//! store that can fail chosen upsert calls.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use lifeos::config::LifeosConfig;
use lifeos::io::{
    ExportService, Format, ImportOptions, ImportService, SharedCollections, SharingPolicy,
};
use lifeos::storage::{FetchScope, RecordStore, SqliteRecordStore};
use lifeos::{Error, ExportEnvelope, Record, Result, UserId};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn policy() -> Arc<dyn SharingPolicy> {
    Arc::new(LifeosConfig::default().sharing_policy())
}

fn services(store: &Arc<SqliteRecordStore>) -> (ExportService, ImportService) {
    (
        ExportService::new(store.clone(), policy()),
        ImportService::new(store.clone(), policy()),
    )
}

/// Store that logs every upsert and fails the listed call numbers.
#[derive(Default)]
struct ScriptedStore {
    upserts: Mutex<Vec<(String, usize)>>,
    fail_on: Vec<usize>,
}

impl RecordStore for ScriptedStore {
    fn fetch(&self, _collection: &str, _scope: FetchScope<'_>) -> Result<Vec<Record>> {
        Ok(Vec::new())
    }

    fn upsert(&self, collection: &str, records: &[Record]) -> Result<()> {
        let mut upserts = self.upserts.lock().unwrap();
        upserts.push((collection.to_string(), records.len()));
        if self.fail_on.contains(&upserts.len()) {
            return Err(Error::operation("upsert_batch", "statement timeout"));
        }
        Ok(())
    }
}

#[test]
fn test_export_task_categories_json_and_xml() {
    let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
    store
        .upsert(
            "task_categories",
            &[
                record(json!({"id": 1, "name": "Work", "user_id": "u1"})),
                record(json!({"id": 2, "name": "Home", "user_id": "u1"})),
                record(json!({"id": 3, "name": "Other", "user_id": "u2"})),
            ],
        )
        .unwrap();
    let (export, _) = services(&store);

    let mut json_out = Vec::new();
    export
        .export_to_writer(&mut json_out, "task_categories", &UserId::new("u1"), Format::Json)
        .unwrap();
    let document: Value = serde_json::from_slice(&json_out).unwrap();
    assert_eq!(document["exportType"], "task_categories");
    assert_eq!(document["version"], "1.0");
    let names: Vec<&str> = document["data"]["task_categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Work", "Home"]);

    let envelope = export.export("task_categories", &UserId::new("u1")).unwrap();
    let xml = Format::Xml.codec().encode(&envelope).unwrap();
    assert_eq!(Format::Xml.codec().decode(&xml).unwrap(), envelope);
}

#[test]
fn test_xml_round_trip_escapes_special_characters() {
    let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
    let name = "R&D <\"core\"> 'team'";
    store
        .upsert(
            "task_categories",
            &[record(json!({"id": 1, "name": name, "user_id": "u1"}))],
        )
        .unwrap();
    let (export, _) = services(&store);

    let envelope = export.export("task_categories", &UserId::new("u1")).unwrap();
    let xml = Format::Xml.codec().encode(&envelope).unwrap();
    assert!(xml.contains("R&amp;D &lt;&quot;core&quot;&gt; &apos;team&apos;"));

    let decoded = Format::Xml.codec().decode(&xml).unwrap();
    assert_eq!(decoded.data["task_categories"][0]["name"], name);
}

#[test]
fn test_unknown_preset_fails_without_writes() {
    let store = Arc::new(ScriptedStore::default());
    let import = ImportService::new(store.clone(), policy());
    let document = r#"{"exportType": "unknown_preset", "exportedAt": "", "version": "1.0",
                       "data": {"tasks": [{"id": 1}]}}"#;

    let err = import
        .import_from_reader(document.as_bytes(), Some(Format::Json), &UserId::new("u1"))
        .unwrap_err();
    assert!(err.to_string().contains("unknown export type"));
    assert!(store.upserts.lock().unwrap().is_empty());
}

#[test]
fn test_250_tasks_import_in_three_batches_despite_failure() {
    let store = Arc::new(ScriptedStore {
        fail_on: vec![2],
        ..ScriptedStore::default()
    });
    let import = ImportService::new(store.clone(), policy());
    let tasks: Vec<Record> = (1..=250)
        .map(|i| record(json!({"id": i, "title": format!("task {i}")})))
        .collect();
    let envelope = ExportEnvelope::new(
        "tasks",
        BTreeMap::from([("tasks".to_string(), tasks)]),
    );

    let result = import.import(&envelope, &UserId::new("u1")).unwrap();

    let sizes: Vec<usize> = store.upserts.lock().unwrap().iter().map(|(_, n)| *n).collect();
    assert_eq!(sizes, [100, 100, 50]);
    assert_eq!(result.imported, 250);
    assert_eq!(result.written, 150);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("tasks: batch 2 failed:"));
    assert!(result.errors[0].contains("statement timeout"));
}

#[test]
fn test_import_is_idempotent() {
    let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
    let (_, import) = services(&store);
    let envelope = ExportEnvelope::new(
        "goals",
        BTreeMap::from([
            (
                "goals".to_string(),
                vec![record(json!({"id": 1, "title": "Run"})), record(json!({"id": 2}))],
            ),
            (
                "goal_milestones".to_string(),
                vec![record(json!({"id": 10, "goal_id": 1}))],
            ),
        ]),
    );
    let user = UserId::new("u1");

    import.import(&envelope, &user).unwrap();
    let first = store.fetch("goals", FetchScope::All).unwrap();
    import.import(&envelope, &user).unwrap();

    assert_eq!(store.fetch("goals", FetchScope::All).unwrap(), first);
    assert_eq!(store.count("goals", FetchScope::All).unwrap(), 2);
    assert_eq!(store.count("goal_milestones", FetchScope::All).unwrap(), 1);
}

#[test]
fn test_import_claims_owned_records_for_acting_user() {
    let store = Arc::new(SqliteRecordStore::in_memory().unwrap());
    let (_, import) = services(&store);
    let envelope = ExportEnvelope::new(
        "full_backup",
        BTreeMap::from([
            ("notes".to_string(), vec![record(json!({"id": 1, "user_id": "u9"}))]),
            ("devices".to_string(), vec![record(json!({"id": 1, "user_id": "u9"}))]),
        ]),
    );

    import.import(&envelope, &UserId::new("u1")).unwrap();

    let notes = store.fetch("notes", FetchScope::All).unwrap();
    assert_eq!(notes[0]["user_id"], "u1");
    let devices = store.fetch("devices", FetchScope::All).unwrap();
    assert_eq!(devices[0]["user_id"], "u9");
}

#[test]
fn test_full_backup_writes_parents_before_children() {
    let store = Arc::new(ScriptedStore::default());
    let import = ImportService::new(store.clone(), policy());
    let data: BTreeMap<String, Vec<Record>> = [
        "support_contacts",
        "support_orgs",
        "devices",
        "device_categories",
        "notes",
        "note_folders",
        "goal_milestones",
        "goals",
        "tasks",
        "task_categories",
    ]
    .into_iter()
    .map(|c| (c.to_string(), vec![record(json!({"id": 1}))]))
    .collect();

    import
        .import(&ExportEnvelope::new("full_backup", data), &UserId::new("u1"))
        .unwrap();

    let order: Vec<String> = store
        .upserts
        .lock()
        .unwrap()
        .iter()
        .map(|(c, _)| c.clone())
        .collect();
    let position = |name: &str| order.iter().position(|c| c == name).unwrap();
    assert!(position("task_categories") < position("tasks"));
    assert!(position("goals") < position("goal_milestones"));
    assert!(position("note_folders") < position("notes"));
    assert!(position("device_categories") < position("devices"));
    assert!(position("support_orgs") < position("support_contacts"));
}

#[test]
fn test_empty_envelope_imports_nothing() {
    let store = Arc::new(ScriptedStore::default());
    let import = ImportService::new(store.clone(), policy());

    for data in [
        BTreeMap::new(),
        BTreeMap::from([
            ("task_categories".to_string(), Vec::new()),
            ("tasks".to_string(), Vec::new()),
        ]),
    ] {
        let result = import
            .import(&ExportEnvelope::new("tasks", data), &UserId::new("u1"))
            .unwrap();
        assert_eq!(result.imported, 0);
        assert!(result.errors.is_empty());
    }
    assert!(store.upserts.lock().unwrap().is_empty());
}

#[test]
fn test_malformed_xml_is_rejected_before_writes() {
    let store = Arc::new(ScriptedStore::default());
    let import = ImportService::new(store.clone(), policy());
    let xml = "<LifeOSExport><exportType>tasks</exportType><data><tasks><item><id>1</id></tasks>";

    let err = import
        .import_from_reader(xml.as_bytes(), None, &UserId::new("u1"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidXml(_)));
    assert!(store.upserts.lock().unwrap().is_empty());
}

#[test]
fn test_export_file_imports_into_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(SqliteRecordStore::new(dir.path().join("source.db")).unwrap());
    source
        .upsert(
            "notes",
            &[
                record(json!({"id": "n1", "user_id": "u1", "body": "hello", "search_vector": "'hello':1"})),
                record(json!({"id": "n2", "user_id": "u1", "body": "world", "pinned": true})),
            ],
        )
        .unwrap();
    source
        .upsert("note_folders", &[record(json!({"id": "f1", "user_id": "u1"}))])
        .unwrap();

    let (export, _) = services(&source);
    for format in Format::all() {
        let result = export
            .export_to_dir(dir.path(), "notes", &UserId::new("u1"), *format)
            .unwrap();
        assert_eq!(result.exported, 3);

        let target = Arc::new(SqliteRecordStore::in_memory().unwrap());
        let (_, import) = services(&target);
        let loaded = import
            .import_from_file(&result.output_path.unwrap(), None, &UserId::new("u2"))
            .unwrap();
        assert_eq!(loaded.imported, 3);
        assert!(loaded.is_clean());

        let notes = target.fetch("notes", FetchScope::OwnedBy(&UserId::new("u2"))).unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes[0].get("search_vector").is_none());
        assert_eq!(notes[1]["pinned"], true);
    }
}

#[test]
fn test_batch_size_option_controls_chunking() {
    let store = Arc::new(ScriptedStore::default());
    let import = ImportService::new(store.clone(), Arc::new(SharedCollections::default()))
        .with_options(ImportOptions::default().with_batch_size(7));
    let notes: Vec<Record> = (0..20).map(|i| record(json!({"id": i}))).collect();

    import
        .import(
            &ExportEnvelope::new("notes", BTreeMap::from([("notes".to_string(), notes)])),
            &UserId::new("u1"),
        )
        .unwrap();

    let sizes: Vec<usize> = store.upserts.lock().unwrap().iter().map(|(_, n)| *n).collect();
    assert_eq!(sizes, [7, 7, 6]);
}
