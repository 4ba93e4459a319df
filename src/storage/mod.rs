//! Storage layer.
//!
//! The export and import services talk to a [`RecordStore`]: row-level
//! fetch with owned/shared filtering and upsert-by-id. Push subscriptions go
//! through a [`SubscriptionStore`]. [`SqliteRecordStore`] implements both.

// Dropping the connection guard a few statements early buys nothing.
#![allow(clippy::significant_drop_tightening)]

pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteRecordStore;
pub use traits::{FetchScope, RecordStore, SubscriptionStore};
