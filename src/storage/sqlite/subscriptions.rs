//! [`SubscriptionStore`] implementation.

use super::SqliteRecordStore;
use super::connection::acquire_lock;
use super::metrics::{record_operation_metrics, status_of};
use crate::models::{PushSubscription, UserId};
use crate::storage::traits::SubscriptionStore;
use crate::{Error, Result};
use chrono::Utc;
use rusqlite::params;
use std::time::Instant;

impl SubscriptionStore for SqliteRecordStore {
    fn add(&self, user: &UserId, endpoint: &str) -> Result<PushSubscription> {
        if endpoint.trim().is_empty() {
            return Err(Error::InvalidInput("endpoint must not be empty".to_string()));
        }

        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let id: i64 = conn
                .query_row(
                    "INSERT INTO push_subscriptions (user_id, endpoint, created_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(endpoint) DO UPDATE SET user_id = excluded.user_id
                     RETURNING id",
                    params![user.as_str(), endpoint, Utc::now().to_rfc3339()],
                    |row| row.get(0),
                )
                .map_err(|e| Error::operation("add_subscription", e))?;
            Ok(PushSubscription {
                id,
                user_id: user.clone(),
                endpoint: endpoint.to_string(),
            })
        })();

        record_operation_metrics("add_subscription", start, status_of(&result));
        result
    }

    fn list_for_user(&self, user: &UserId) -> Result<Vec<PushSubscription>> {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, endpoint FROM push_subscriptions WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(|e| Error::operation("list_subscriptions", e))?;
        let rows = stmt
            .query_map(params![user.as_str()], |row| {
                Ok(PushSubscription {
                    id: row.get(0)?,
                    user_id: user.clone(),
                    endpoint: row.get(1)?,
                })
            })
            .and_then(Iterator::collect)
            .map_err(|e| Error::operation("list_subscriptions", e))?;
        Ok(rows)
    }

    fn remove(&self, id: i64) -> Result<bool> {
        let conn = acquire_lock(&self.conn);
        let removed = conn
            .execute("DELETE FROM push_subscriptions WHERE id = ?1", params![id])
            .map_err(|e| Error::operation("remove_subscription", e))?;
        Ok(removed > 0)
    }
}
