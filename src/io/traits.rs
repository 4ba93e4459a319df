//! Core traits for import/export operations.
//!
//! Defines the [`EnvelopeCodec`] trait that format adapters implement.

use crate::Result;
use crate::models::ExportEnvelope;

/// Encoder and decoder for one export file format.
///
/// Export files are small whole documents rather than record streams, so a
/// codec works on complete envelopes.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl EnvelopeCodec for JsonCodec {
///     fn encode(&self, envelope: &ExportEnvelope) -> Result<String> {
///         serde_json::to_string_pretty(envelope).map_err(|e| Error::operation("write_json", e))
///     }
///
///     fn decode(&self, input: &str) -> Result<ExportEnvelope> {
///         ExportEnvelope::from_value(serde_json::from_str(input)?)
///     }
/// }
/// ```
pub trait EnvelopeCodec: Send + Sync {
    /// Renders an envelope as a document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn encode(&self, envelope: &ExportEnvelope) -> Result<String>;

    /// Parses a document back into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidFile`] or [`crate::Error::InvalidXml`]
    /// when the document cannot be understood.
    fn decode(&self, input: &str) -> Result<ExportEnvelope>;
}
