//! Record store trait.

use crate::Result;
use crate::models::{Record, UserId};

/// Row filter applied to a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchScope<'a> {
    /// Every row of the collection.
    All,
    /// Only rows whose ownership key equals the given user.
    OwnedBy(&'a UserId),
}

/// Trait for the backing row store.
///
/// Implementations must be safe to call from several threads at once: the
/// exporter fetches every collection of a preset concurrently.
pub trait RecordStore: Send + Sync {
    /// Returns the rows of `collection` visible under `scope`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    fn fetch(&self, collection: &str, scope: FetchScope<'_>) -> Result<Vec<Record>>;

    /// Inserts or updates `records`, keyed by identifier.
    ///
    /// A call either applies every record or none of them.
    ///
    /// # Errors
    ///
    /// Returns an error if any record lacks an identifier or the write fails.
    fn upsert(&self, collection: &str, records: &[Record]) -> Result<()>;

    /// Returns the number of rows in `collection` visible under `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    fn count(&self, collection: &str, scope: FetchScope<'_>) -> Result<usize> {
        Ok(self.fetch(collection, scope)?.len())
    }
}
