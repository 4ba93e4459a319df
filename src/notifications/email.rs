//! Email delivery through a transactional email API.

use super::NotificationMessage;
use crate::config::NotificationsConfig;
use crate::models::UserId;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

/// Trait for email delivery backends.
pub trait EmailGateway: Send + Sync {
    /// Sends `message` to the user's address on file.
    ///
    /// # Errors
    ///
    /// Returns an error if the message was not accepted.
    fn send(&self, recipient: &UserId, message: &NotificationMessage) -> Result<()>;
}

/// Request body accepted by the email API.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EmailRequest<'a> {
    /// Recipient user; the API resolves the address.
    pub to_user: &'a str,
    /// Sender address.
    pub from: &'a str,
    /// Subject line.
    pub subject: &'a str,
    /// Plain-text body.
    pub text: String,
}

impl<'a> EmailRequest<'a> {
    /// Builds the request body for a message.
    #[must_use]
    pub fn new(recipient: &'a UserId, from: &'a str, message: &'a NotificationMessage) -> Self {
        let text = match &message.url {
            Some(url) => format!("{}\n\n{url}", message.body),
            None => message.body.clone(),
        };
        Self {
            to_user: recipient.as_str(),
            from,
            subject: &message.title,
            text,
        }
    }
}

/// Email gateway posting to an HTTP API with a bearer key.
pub struct HttpEmailGateway {
    client: reqwest::blocking::Client,
    url: String,
    api_key: SecretString,
    from: String,
}

impl HttpEmailGateway {
    /// Creates a gateway.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        api_key: SecretString,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("LifeOS/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            client,
            url: url.into(),
            api_key,
            from: from.into(),
        }
    }

    /// Creates a gateway from configuration, or `None` if the API URL or key
    /// is missing.
    #[must_use]
    pub fn from_config(config: &NotificationsConfig) -> Option<Self> {
        let url = config.email_api_url.as_ref()?;
        let key = config.email_api_key.as_ref()?;
        Some(Self::new(
            url.clone(),
            key.clone(),
            config.email_from.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }
}

impl EmailGateway for HttpEmailGateway {
    fn send(&self, recipient: &UserId, message: &NotificationMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmailRequest::new(recipient, &self.from, message))
            .send()
            .map_err(|e| Error::operation("send_email", e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::operation("send_email", format!("HTTP {}", status.as_u16())))
        }
    }
}
