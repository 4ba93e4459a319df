//! Configuration management.
//!
//! Settings come from a TOML file, then environment variables override
//! individual values. Every field has a default, so an absent file is not an
//! error.

mod sections;

pub use sections::{
    DEFAULT_SHARED_COLLECTIONS, ImportConfig, LoggingSettings, NotificationsConfig,
    RecordsConfig, SharingConfig,
};

use crate::io::SharedCollections;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LIFEOS_CONFIG_PATH";

/// Main configuration for lifeos.
#[derive(Debug, Clone)]
pub struct LifeosConfig {
    /// Directory holding the database and local state.
    pub data_dir: PathBuf,
    /// Database file; defaults to `<data_dir>/lifeos.db`.
    pub database: Option<PathBuf>,
    /// Acting user when none is given on the command line.
    pub user_id: Option<String>,
    /// Record field names.
    pub records: RecordsConfig,
    /// Shared collection names.
    pub sharing: SharingConfig,
    /// Import settings.
    pub import: ImportConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Notification delivery settings.
    pub notifications: NotificationsConfig,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Database file.
    pub database: Option<String>,
    /// Default acting user.
    pub user_id: Option<String>,
    /// Records section.
    pub records: Option<ConfigFileRecords>,
    /// Sharing section.
    pub sharing: Option<ConfigFileSharing>,
    /// Import section.
    pub import: Option<ConfigFileImport>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Notifications section.
    pub notifications: Option<ConfigFileNotifications>,
}

/// Records section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileRecords {
    /// Upsert key field.
    pub id_field: Option<String>,
    /// Ownership key field.
    pub owner_field: Option<String>,
    /// Generated fields.
    pub derived_fields: Option<Vec<String>>,
}

/// Sharing section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSharing {
    /// Shared collection names.
    pub shared_collections: Option<Vec<String>>,
}

/// Import section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileImport {
    /// Records per upsert call.
    pub batch_size: Option<usize>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Filter directive.
    pub level: Option<String>,
    /// Output format.
    pub format: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// Notifications section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileNotifications {
    /// Email API endpoint.
    pub email_api_url: Option<String>,
    /// Email API key.
    pub email_api_key: Option<String>,
    /// Sender address.
    pub email_from: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for LifeosConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".lifeos"),
            database: None,
            user_id: None,
            records: RecordsConfig::default(),
            sharing: SharingConfig::default(),
            import: ImportConfig::default(),
            logging: LoggingSettings::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl LifeosConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_config_file", format!("{}: {e}", path.display())))?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| Error::operation("parse_config_file", e))?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/lifeos/` on macOS)
    /// 2. XDG config dir (`~/.config/lifeos/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("lifeos").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("lifeos")
                .join("config.toml"),
        ];
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        Self::default()
    }

    /// Loads configuration for the binary.
    ///
    /// An explicit path (or `LIFEOS_CONFIG_PATH`) must exist and parse;
    /// otherwise the default locations are tried. Environment overrides are
    /// applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Converts a `ConfigFile` to `LifeosConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        config.database = file.database.map(PathBuf::from);
        config.user_id = file.user_id.filter(|u| !u.is_empty());

        if let Some(records) = file.records {
            if let Some(v) = records.id_field {
                config.records.id_field = v;
            }
            if let Some(v) = records.owner_field {
                config.records.owner_field = v;
            }
            if let Some(v) = records.derived_fields {
                config.records.derived_fields = v;
            }
        }
        if let Some(v) = file.sharing.and_then(|s| s.shared_collections) {
            config.sharing.shared_collections = v;
        }
        if let Some(v) = file.import.and_then(|i| i.batch_size) {
            config.import.batch_size = v.max(1);
        }
        if let Some(logging) = file.logging {
            config.logging.level = logging.level;
            config.logging.format = logging.format;
            config.logging.file = logging.file.map(PathBuf::from);
        }
        if let Some(notifications) = file.notifications {
            config.notifications.email_api_url = notifications.email_api_url;
            config.notifications.email_api_key =
                notifications.email_api_key.map(SecretString::from);
            if let Some(v) = notifications.email_from {
                config.notifications.email_from = v;
            }
            if let Some(v) = notifications.timeout_secs {
                config.notifications.timeout_secs = v;
            }
        }

        config
    }

    /// Applies `LIFEOS_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LIFEOS_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get("LIFEOS_USER_ID") {
            self.user_id = Some(v);
        }
        if let Some(v) = get("LIFEOS_LOG_LEVEL") {
            self.logging.level = Some(v);
        }
        if let Some(v) = get("LIFEOS_LOG_FORMAT") {
            self.logging.format = Some(v);
        }
        if let Some(v) = get("LIFEOS_EMAIL_API_KEY") {
            self.notifications.email_api_key = Some(SecretString::from(v));
        }
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Returns the database file path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| self.data_dir.join("lifeos.db"))
    }

    /// Returns the local state file path.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    /// Builds the sharing policy from the configured collection names.
    #[must_use]
    pub fn sharing_policy(&self) -> SharedCollections {
        SharedCollections::new(self.sharing.shared_collections.iter().cloned())
    }
}
