//! Command handlers module.
//!
//! - `io.rs`: preset listing, export and import
//! - `notify.rs`: push subscriptions and notification dispatch
//! - `state.rs`: local state inspection

mod io;
mod notify;
mod state;

use clap::Subcommand;
use lifeos::config::LifeosConfig;
use lifeos::{IdentityProvider, Result, SqliteRecordStore, StaticIdentity, UserId};
use std::sync::Arc;

pub use io::{cmd_export, cmd_import, cmd_presets};
pub use notify::{cmd_notify, cmd_subscription};
pub use state::cmd_state;

/// Push subscription subcommands.
#[derive(Subcommand)]
pub enum SubscriptionAction {
    /// Register a push endpoint.
    Add {
        /// Push service endpoint URL.
        #[arg(short, long)]
        endpoint: String,

        /// Acting user.
        #[arg(short, long)]
        user: Option<String>,
    },

    /// List registered endpoints.
    List {
        /// Acting user.
        #[arg(short, long)]
        user: Option<String>,
    },
}

/// Local state subcommands.
#[derive(Subcommand)]
pub enum StateAction {
    /// Print every stored key.
    Show,

    /// Store a value. JSON literals (`true`, `3`) keep their type.
    Set {
        /// Key to set.
        key: String,

        /// Value to store.
        value: String,
    },

    /// Forget all local state.
    Clear,
}

/// Opens the configured database.
fn open_store(config: &LifeosConfig) -> Result<Arc<SqliteRecordStore>> {
    let store = SqliteRecordStore::with_fields(config.database_path(), &config.records)?;
    Ok(Arc::new(store))
}

/// Resolves the acting user from the flag, environment and configuration.
fn acting_user(config: &LifeosConfig, flag: Option<&str>) -> Result<UserId> {
    StaticIdentity::from_sources(flag, config.user_id.as_deref()).current_user()
}
