//! Push subscription store trait.

use crate::Result;
use crate::models::{PushSubscription, UserId};

/// Trait for persisting push subscriptions.
pub trait SubscriptionStore: Send + Sync {
    /// Registers `endpoint` for `user`.
    ///
    /// Registering an endpoint that already exists moves it to `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add(&self, user: &UserId, endpoint: &str) -> Result<PushSubscription>;

    /// Lists the subscriptions of `user`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_for_user(&self, user: &UserId) -> Result<Vec<PushSubscription>>;

    /// Removes a subscription. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn remove(&self, id: i64) -> Result<bool>;
}
