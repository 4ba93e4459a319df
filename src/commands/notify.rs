//! Push subscription and notification command handlers.

use std::sync::Arc;
use std::time::Duration;

use super::{SubscriptionAction, acting_user, open_store};
use lifeos::config::LifeosConfig;
use lifeos::notifications::{
    Channel, HttpEmailGateway, HttpPushGateway, NotificationMessage, NotificationService,
};
use lifeos::storage::SubscriptionStore;
use lifeos::{Result, UserId};

/// Executes a subscription subcommand.
pub fn cmd_subscription(config: &LifeosConfig, action: SubscriptionAction) -> Result<()> {
    let store = open_store(config)?;

    match action {
        SubscriptionAction::Add { endpoint, user } => {
            let user = acting_user(config, user.as_deref())?;
            let subscription = store.add(&user, &endpoint)?;
            println!("Subscription {} registered for {user}", subscription.id);
        },
        SubscriptionAction::List { user } => {
            let user = acting_user(config, user.as_deref())?;
            let subscriptions = store.list_for_user(&user)?;
            if subscriptions.is_empty() {
                println!("No push subscriptions for {user}");
            }
            for subscription in subscriptions {
                println!("{:>6}  {}", subscription.id, subscription.endpoint);
            }
        },
    }

    Ok(())
}

/// Executes the notify command.
pub fn cmd_notify(
    config: &LifeosConfig,
    recipient: &str,
    title: String,
    body: String,
    url: Option<String>,
    channels: &[String],
) -> Result<()> {
    let channels = channels
        .iter()
        .map(|c| c.parse::<Channel>())
        .collect::<Result<Vec<_>>>()?;

    let timeout = Duration::from_secs(config.notifications.timeout_secs);
    let mut service = NotificationService::new(
        open_store(config)?,
        Arc::new(HttpPushGateway::with_timeout(timeout)),
    );
    if let Some(email) = HttpEmailGateway::from_config(&config.notifications) {
        service = service.with_email(Arc::new(email));
    }

    let mut message = NotificationMessage::new(title, body);
    message.url = url;

    let report = service.notify(&UserId::new(recipient), &message, &channels)?;

    println!("Sent: {}", report.sent);
    if report.pruned > 0 {
        println!("Pruned subscriptions: {}", report.pruned);
    }
    for failure in &report.failures {
        println!("  - {failure}");
    }

    Ok(())
}
