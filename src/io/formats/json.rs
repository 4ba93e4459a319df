//! JSON format adapter.
//!
//! The envelope is written as a single pretty-printed object and read back
//! through [`ExportEnvelope::from_value`].

use crate::io::traits::EnvelopeCodec;
use crate::models::ExportEnvelope;
use crate::{Error, Result};

/// JSON envelope codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl EnvelopeCodec for JsonCodec {
    fn encode(&self, envelope: &ExportEnvelope) -> Result<String> {
        serde_json::to_string_pretty(envelope).map_err(|e| Error::operation("write_json", e))
    }

    fn decode(&self, input: &str) -> Result<ExportEnvelope> {
        let value: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| Error::InvalidFile(format!("not well-formed JSON: {e}")))?;
        ExportEnvelope::from_value(value)
    }
}
