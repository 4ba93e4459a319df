//! Storage backend traits.

mod records;
mod subscriptions;

pub use records::{FetchScope, RecordStore};
pub use subscriptions::SubscriptionStore;
