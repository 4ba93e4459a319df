//! Web push delivery.

use super::NotificationMessage;
use crate::models::PushSubscription;
use std::time::Duration;

/// Outcome of one push attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The push service accepted the message.
    Delivered,
    /// The subscription no longer exists and should be pruned.
    Gone,
    /// Delivery failed for another reason.
    Failed(String),
}

impl PushOutcome {
    /// Maps an HTTP status from the push service to an outcome.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Delivered,
            404 | 410 => Self::Gone,
            other => Self::Failed(format!("push service answered HTTP {other}")),
        }
    }
}

/// Trait for push delivery backends.
pub trait PushGateway: Send + Sync {
    /// Sends `message` to one subscription.
    fn send(&self, subscription: &PushSubscription, message: &NotificationMessage) -> PushOutcome;
}

/// Push gateway posting JSON to the subscription endpoint.
pub struct HttpPushGateway {
    client: reqwest::blocking::Client,
}

impl HttpPushGateway {
    /// Creates a gateway with the given request timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("LifeOS/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self { client }
    }
}

impl PushGateway for HttpPushGateway {
    fn send(&self, subscription: &PushSubscription, message: &NotificationMessage) -> PushOutcome {
        let response = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", "86400")
            .json(message)
            .send();

        match response {
            Ok(response) => PushOutcome::from_status(response.status().as_u16()),
            Err(e) => PushOutcome::Failed(format!("push request failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(200 => PushOutcome::Delivered ; "ok")]
    #[test_case(201 => PushOutcome::Delivered ; "created")]
    #[test_case(404 => PushOutcome::Gone ; "not found")]
    #[test_case(410 => PushOutcome::Gone ; "gone")]
    #[test_case(429 => PushOutcome::Failed("push service answered HTTP 429".to_string()) ; "rate limited")]
    fn test_from_status(status: u16) -> PushOutcome {
        PushOutcome::from_status(status)
    }
}
