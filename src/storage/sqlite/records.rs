//! [`RecordStore`] implementation.

use super::SqliteRecordStore;
use super::connection::acquire_lock;
use super::metrics::{record_operation_metrics, status_of};
use crate::models::{Record, record_id_key};
use crate::storage::traits::{FetchScope, RecordStore};
use crate::{Error, Result};
use rusqlite::{Connection, params};
use serde_json::Value;
use std::time::Instant;
use tracing::instrument;

impl SqliteRecordStore {
    fn owner_of(&self, record: &Record) -> Option<String> {
        match record.get(&self.owner_field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    fn write_rows(&self, conn: &Connection, collection: &str, records: &[Record]) -> Result<()> {
        let mut stmt = conn
            .prepare_cached(
                "INSERT INTO records (collection, id, owner, body) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(collection, id) DO UPDATE SET owner = excluded.owner, body = excluded.body",
            )
            .map_err(|e| Error::operation("prepare_upsert", e))?;

        for (index, record) in records.iter().enumerate() {
            let id = record_id_key(record, &self.id_field).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "record {index} in '{collection}' has no usable '{}' field",
                    self.id_field
                ))
            })?;
            let body =
                serde_json::to_string(record).map_err(|e| Error::operation("encode_record", e))?;
            stmt.execute(params![collection, id, self.owner_of(record), body])
                .map_err(|e| Error::operation("upsert_record", e))?;
        }
        Ok(())
    }
}

fn decode_body(body: &str) -> Result<Record> {
    serde_json::from_str(body).map_err(|e| Error::operation("decode_record", e))
}

impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self), fields(backend = "sqlite"))]
    fn fetch(&self, collection: &str, scope: FetchScope<'_>) -> Result<Vec<Record>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let bodies: Vec<String> = match scope {
                FetchScope::All => {
                    let mut stmt = conn
                        .prepare_cached(
                            "SELECT body FROM records WHERE collection = ?1 ORDER BY rowid",
                        )
                        .map_err(|e| Error::operation("fetch_collection", e))?;
                    stmt.query_map(params![collection], |row| row.get(0))
                        .and_then(Iterator::collect)
                        .map_err(|e| Error::operation("fetch_collection", e))?
                },
                FetchScope::OwnedBy(user) => {
                    let mut stmt = conn
                        .prepare_cached(
                            "SELECT body FROM records WHERE collection = ?1 AND owner = ?2 ORDER BY rowid",
                        )
                        .map_err(|e| Error::operation("fetch_collection", e))?;
                    stmt.query_map(params![collection, user.as_str()], |row| row.get(0))
                        .and_then(Iterator::collect)
                        .map_err(|e| Error::operation("fetch_collection", e))?
                },
            };
            drop(conn);
            bodies.iter().map(|body| decode_body(body)).collect()
        })();

        record_operation_metrics("fetch", start, status_of(&result));
        result
    }

    #[instrument(skip(self, records), fields(backend = "sqlite", records = records.len()))]
    fn upsert(&self, collection: &str, records: &[Record]) -> Result<()> {
        let start = Instant::now();
        let result = (|| {
            let mut conn = acquire_lock(&self.conn);
            let tx = conn
                .transaction()
                .map_err(|e| Error::operation("begin_transaction", e))?;
            self.write_rows(&tx, collection, records)?;
            tx.commit()
                .map_err(|e| Error::operation("commit_transaction", e))
        })();

        record_operation_metrics("upsert", start, status_of(&result));
        result
    }

    fn count(&self, collection: &str, scope: FetchScope<'_>) -> Result<usize> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = match scope {
            FetchScope::All => conn.query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            ),
            FetchScope::OwnedBy(user) => conn.query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1 AND owner = ?2",
                params![collection, user.as_str()],
                |row| row.get(0),
            ),
        }
        .map_err(|e| Error::operation("count_collection", e))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
