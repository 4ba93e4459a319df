//! Push and email notification dispatch.
//!
//! Other parts of the dashboard (reminders, shared-device changes) call
//! [`NotificationService::notify`] with a recipient and a message. Every
//! push subscription of the recipient is attempted; subscriptions the push
//! service reports as gone are deleted on the spot.

mod email;
mod push;

pub use email::{EmailGateway, EmailRequest, HttpEmailGateway};
pub use push::{HttpPushGateway, PushGateway, PushOutcome};

use crate::models::UserId;
use crate::storage::SubscriptionStore;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

/// A notification to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    /// Short title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Link opened when the notification is clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NotificationMessage {
    /// Creates a message without a link.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: None,
        }
    }

    /// Attaches a link.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Web push to every registered subscription.
    Push,
    /// Email to the user's address on file.
    Email,
}

impl Channel {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "push" => Ok(Self::Push),
            "email" => Ok(Self::Email),
            other => Err(Error::InvalidInput(format!("unknown channel: {other}"))),
        }
    }
}

/// Aggregate outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Deliveries accepted across all channels.
    pub sent: usize,
    /// Push subscriptions removed because they are gone.
    pub pruned: usize,
    /// One message per failed delivery.
    pub failures: Vec<String>,
}

/// Dispatches notifications over push and email.
pub struct NotificationService {
    subscriptions: Arc<dyn SubscriptionStore>,
    push: Arc<dyn PushGateway>,
    email: Option<Arc<dyn EmailGateway>>,
}

impl NotificationService {
    /// Creates a service without an email channel.
    #[must_use]
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, push: Arc<dyn PushGateway>) -> Self {
        Self {
            subscriptions,
            push,
            email: None,
        }
    }

    /// Enables the email channel.
    #[must_use]
    pub fn with_email(mut self, email: Arc<dyn EmailGateway>) -> Self {
        self.email = Some(email);
        self
    }

    /// Delivers `message` to `recipient` over each of `channels`.
    ///
    /// Individual delivery failures are reported, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the recipient's subscriptions cannot be read.
    #[instrument(skip(self, message), fields(recipient = %recipient))]
    pub fn notify(
        &self,
        recipient: &UserId,
        message: &NotificationMessage,
        channels: &[Channel],
    ) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();

        if channels.contains(&Channel::Push) {
            self.dispatch_push(recipient, message, &mut report)?;
        }
        if channels.contains(&Channel::Email) {
            self.dispatch_email(recipient, message, &mut report);
        }

        metrics::counter!("lifeos_notifications_sent_total").increment(report.sent as u64);
        tracing::info!(
            sent = report.sent,
            pruned = report.pruned,
            failed = report.failures.len(),
            "Notification dispatched"
        );
        Ok(report)
    }

    fn dispatch_push(
        &self,
        recipient: &UserId,
        message: &NotificationMessage,
        report: &mut DispatchReport,
    ) -> Result<()> {
        for subscription in self.subscriptions.list_for_user(recipient)? {
            match self.push.send(&subscription, message) {
                PushOutcome::Delivered => report.sent += 1,
                PushOutcome::Gone => match self.subscriptions.remove(subscription.id) {
                    Ok(_) => {
                        report.pruned += 1;
                        metrics::counter!("lifeos_push_subscriptions_pruned_total").increment(1);
                        tracing::debug!(subscription = subscription.id, "Pruned gone subscription");
                    },
                    Err(e) => report
                        .failures
                        .push(format!("push {}: prune failed: {e}", subscription.id)),
                },
                PushOutcome::Failed(cause) => {
                    tracing::warn!(subscription = subscription.id, %cause, "Push delivery failed");
                    report
                        .failures
                        .push(format!("push {}: {cause}", subscription.id));
                },
            }
        }
        Ok(())
    }

    fn dispatch_email(
        &self,
        recipient: &UserId,
        message: &NotificationMessage,
        report: &mut DispatchReport,
    ) {
        let Some(email) = &self.email else {
            report
                .failures
                .push("email: channel not configured".to_string());
            return;
        };
        match email.send(recipient, message) {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::warn!(error = %e, "Email delivery failed");
                report.failures.push(format!("email: {e}"));
            },
        }
    }
}
