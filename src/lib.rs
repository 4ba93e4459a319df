//! # LifeOS
//!
//! Export, import and notification core for the LifeOS personal dashboard.
//!
//! The dashboard keeps tasks, goals, notes, device inventory and the support
//! directory in a hosted row store. This crate owns the parts of that system
//! with real behaviour behind them:
//!
//! - Named export presets that bundle collections parent-before-child
//! - A concurrent fetcher honouring owned vs shared row scoping
//! - JSON and a private XML dialect for export files, both readable back
//! - An idempotent, batched upsert loader with best-effort error reporting
//! - Push/email dispatch with dead subscription pruning
//!
//! ## Example
//!
//! ```rust,ignore
//! use lifeos::io::{ExportService, Format};
//! use lifeos::UserId;
//!
//! let envelope = service.export("tasks", &UserId::new("u1"))?;
//! let xml = Format::Xml.codec().encode(&envelope)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod identity;
pub mod io;
pub mod models;
pub mod notifications;
pub mod observability;
pub mod state;
pub mod storage;

// Re-exports for convenience
pub use config::LifeosConfig;
pub use identity::{IdentityProvider, StaticIdentity};
pub use models::{ExportEnvelope, ExportPreset, Record, Scope, UserId};
pub use storage::{RecordStore, SqliteRecordStore};

/// Error type for lifeos operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Bad CLI arguments, unknown format names, malformed config values |
/// | `InvalidFile` | Uploaded file is not well-formed JSON or lacks `exportType` / `data` |
/// | `InvalidXml` | The XML parser rejects the uploaded document |
/// | `UnknownPreset` | An export or import names a preset the registry does not know |
/// | `OperationFailed` | Store queries, file I/O, HTTP delivery |
/// | `Unauthorized` | No acting user could be resolved |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An export file could not be understood.
    ///
    /// Raised when:
    /// - The document is not well-formed JSON
    /// - `exportType` or `data` is missing
    /// - `data` names a collection the preset does not declare
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// The XML parser reported an error.
    #[error("invalid XML: {0}")]
    InvalidXml(String),

    /// The named export preset does not exist.
    #[error("unknown export type: {0}")]
    UnknownPreset(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` queries or transactions fail
    /// - Filesystem I/O errors occur
    /// - Push or email delivery cannot be attempted
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// No acting user is available.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for lifeos operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownPreset("unknown_preset".to_string());
        assert_eq!(err.to_string(), "unknown export type: unknown_preset");

        let err = Error::operation("upsert_batch", "disk full");
        assert_eq!(err.to_string(), "operation 'upsert_batch' failed: disk full");

        let err = Error::InvalidXml("unexpected end".to_string());
        assert_eq!(err.to_string(), "invalid XML: unexpected end");
    }
}
