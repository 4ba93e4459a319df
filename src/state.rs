//! Persisted local key-value state.
//!
//! Small per-device flags (theme, onboarding, trusted device, lock) kept in a
//! JSON file under the data directory. The state is loaded once at start-up
//! and every change is written through immediately. Logout or reset calls
//! [`LocalState::clear`], which also deletes the file.

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Well-known state keys.
pub mod keys {
    /// Colour theme, `"light"` or `"dark"`.
    pub const THEME: &str = "theme";
    /// Set once the onboarding flow has finished.
    pub const ONBOARDING_COMPLETE: &str = "onboarding_complete";
    /// Set when the user marked this device as trusted.
    pub const TRUSTED_DEVICE: &str = "trusted_device";
    /// Set while the dashboard lock screen is active.
    pub const DASHBOARD_LOCKED: &str = "dashboard_locked";
}

/// JSON-file-backed key-value state.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalState {
    path: PathBuf,
    values: Map<String, Value>,
}

impl LocalState {
    /// Loads the state file, or starts empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFile`] if the file exists but is not a JSON
    /// object, or an I/O error if it cannot be read.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(Value::Object(values)) => values,
                Ok(_) => {
                    return Err(Error::InvalidFile(format!(
                        "{}: state must be a JSON object",
                        path.display()
                    )));
                },
                Err(e) => {
                    return Err(Error::InvalidFile(format!("{}: {e}", path.display())));
                },
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(Error::operation("read_state", e)),
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Local state loaded");
        Ok(Self { path, values })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns `true` only if `key` holds the boolean `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(Value::Bool(true)))
    }

    /// Iterates over all entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Stores a value and persists the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.values.insert(key.into(), value.into());
        self.persist()
    }

    /// Removes a value and persists the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Forgets every value and deletes the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&mut self) -> Result<()> {
        self.values.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::operation("clear_state", e)),
        }
    }

    /// Writes a temporary file and renames it into place.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::operation("create_state_dir", e))?;
        }
        let contents = serde_json::to_string_pretty(&self.values)
            .map_err(|e| Error::operation("encode_state", e))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|e| Error::operation("write_state", e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| Error::operation("write_state", e))
    }
}
