//! Push subscription model.

use super::UserId;
use serde::{Deserialize, Serialize};

/// A browser push endpoint registered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Store-assigned identifier.
    pub id: i64,
    /// Owner of the subscription.
    pub user_id: UserId,
    /// Push service endpoint URL.
    pub endpoint: String,
}
