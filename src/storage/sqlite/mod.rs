//! `SQLite` implementation of the record and subscription stores.
//!
//! Every collection lives in one `records` table keyed by
//! `(collection, id)`. The record body is stored as JSON text; the owner
//! column is extracted from the configured owner field so owned fetches can
//! filter in SQL. Rows come back in first-insertion order because an upsert
//! that hits an existing key updates the row in place and keeps its rowid.
//!
//! Push subscriptions share the database in a `push_subscriptions` table.

mod connection;
mod metrics;
mod records;
mod subscriptions;

pub use connection::{acquire_lock, configure_connection, open_connection};

use crate::config::RecordsConfig;
use crate::{Error, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        owner TEXT,
        body TEXT NOT NULL,
        PRIMARY KEY (collection, id)
    );
    CREATE INDEX IF NOT EXISTS idx_records_owner ON records(collection, owner);
    CREATE TABLE IF NOT EXISTS push_subscriptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        endpoint TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_push_subscriptions_user ON push_subscriptions(user_id);
";

/// `SQLite`-backed row store.
///
/// # Concurrency Model
///
/// `rusqlite::Connection` is not `Sync`, so the connection sits behind a
/// `Mutex`. Concurrent fetches from the exporter serialize on it; WAL mode
/// keeps other processes' readers unblocked.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    id_field: String,
    owner_field: String,
}

impl SqliteRecordStore {
    /// Opens (or creates) a database file with the default field names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_fields(db_path, &RecordsConfig::default())
    }

    /// Opens (or creates) a database file using the configured field names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn with_fields(db_path: impl Into<PathBuf>, fields: &RecordsConfig) -> Result<Self> {
        let db_path = db_path.into();
        let conn = open_connection(&db_path)?;
        Self::from_connection(conn, Some(db_path), fields)
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::operation("open_sqlite_in_memory", e))?;
        configure_connection(&conn);
        Self::from_connection(conn, None, &RecordsConfig::default())
    }

    fn from_connection(
        conn: Connection,
        db_path: Option<PathBuf>,
        fields: &RecordsConfig,
    ) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::operation("initialize_schema", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            id_field: fields.id_field.clone(),
            owner_field: fields.owner_field.clone(),
        })
    }

    /// Returns the database path (`None` for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Returns the field used as the upsert key.
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the field holding the ownership key.
    #[must_use]
    pub fn owner_field(&self) -> &str {
        &self.owner_field
    }
}
