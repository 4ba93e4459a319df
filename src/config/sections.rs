//! Runtime configuration sections.

use secrecy::SecretString;
use std::path::PathBuf;

/// Field names with special meaning inside records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsConfig {
    /// Field used as the upsert key.
    pub id_field: String,
    /// Field holding the ownership key of owned collections.
    pub owner_field: String,
    /// Generated fields dropped on export and import.
    pub derived_fields: Vec<String>,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            owner_field: "user_id".to_string(),
            derived_fields: vec!["search_vector".to_string()],
        }
    }
}

/// Collections whose rows every authenticated user can see and write.
pub const DEFAULT_SHARED_COLLECTIONS: &[&str] = &[
    "device_categories",
    "devices",
    "support_orgs",
    "support_contacts",
];

/// Owned vs shared collection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharingConfig {
    /// Names of the shared collections.
    pub shared_collections: Vec<String>,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            shared_collections: DEFAULT_SHARED_COLLECTIONS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

/// Import settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportConfig {
    /// Records per upsert call.
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: crate::io::services::DEFAULT_BATCH_SIZE,
        }
    }
}

/// Logging settings as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `lifeos=debug`.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Push and email delivery settings.
#[derive(Debug, Clone)]
pub struct NotificationsConfig {
    /// Endpoint of the transactional email API.
    pub email_api_url: Option<String>,
    /// Bearer key for the email API.
    pub email_api_key: Option<SecretString>,
    /// Sender address.
    pub email_from: String,
    /// HTTP timeout for push and email requests.
    pub timeout_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            email_api_url: None,
            email_api_key: None,
            email_from: "LifeOS <notifications@lifeos.local>".to_string(),
            timeout_secs: 10,
        }
    }
}

impl NotificationsConfig {
    /// Returns whether the email channel has everything it needs.
    #[must_use]
    pub const fn email_configured(&self) -> bool {
        self.email_api_url.is_some() && self.email_api_key.is_some()
    }
}
