//! Envelope validation.
//!
//! Runs before any write: an import either passes every check here or
//! touches nothing.

use crate::io::presets::PresetRegistry;
use crate::models::{ExportEnvelope, ExportPreset, Record};
use crate::{Error, Result};

/// Checks an envelope against the preset registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeValidator {
    registry: PresetRegistry,
}

impl EnvelopeValidator {
    /// Creates a validator over the given registry.
    #[must_use]
    pub const fn new(registry: PresetRegistry) -> Self {
        Self { registry }
    }

    /// Resolves the envelope's preset and checks its collection keys.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownPreset`] when `exportType` names no preset
    /// - [`Error::InvalidFile`] when `data` holds a collection the preset
    ///   does not declare
    pub fn validate(&self, envelope: &ExportEnvelope) -> Result<&'static ExportPreset> {
        let preset = self.registry.get(&envelope.export_type)?;

        let foreign: Vec<&str> = envelope
            .data
            .keys()
            .map(String::as_str)
            .filter(|name| !preset.declares(name))
            .collect();
        if !foreign.is_empty() {
            return Err(Error::InvalidFile(format!(
                "collections not part of preset '{}': {}",
                preset.name,
                foreign.join(", ")
            )));
        }

        Ok(preset)
    }
}

/// Removes generated fields from a record.
pub fn strip_derived_fields(record: &mut Record, derived_fields: &[String]) {
    for field in derived_fields {
        record.remove(field);
    }
}
