//! Export service.
//!
//! Fetches every collection of a preset for the acting user and wraps the
//! rows in an [`ExportEnvelope`]. Fetches run concurrently, one scoped
//! thread per collection; the first failure aborts the export and nothing
//! is written.

use crate::config::RecordsConfig;
use crate::io::formats::{Format, export_filename};
use crate::io::policy::SharingPolicy;
use crate::io::presets::PresetRegistry;
use crate::io::validation::strip_derived_fields;
use crate::models::{ExportEnvelope, ExportPreset, Record, Scope, UserId};
use crate::storage::{FetchScope, RecordStore};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Result of an export operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of records exported.
    pub exported: usize,
    /// Number of collections in the envelope.
    pub collections: usize,
    /// Format used for export.
    pub format: Format,
    /// Output path (if file export).
    pub output_path: Option<PathBuf>,
}

impl ExportResult {
    fn for_envelope(envelope: &ExportEnvelope, format: Format) -> Self {
        Self {
            exported: envelope.record_count(),
            collections: envelope.data.len(),
            format,
            output_path: None,
        }
    }

    /// Returns whether any records were exported.
    #[must_use]
    pub const fn has_exports(&self) -> bool {
        self.exported > 0
    }
}

/// Service for exporting presets to envelopes and files.
pub struct ExportService {
    store: Arc<dyn RecordStore>,
    policy: Arc<dyn SharingPolicy>,
    registry: PresetRegistry,
    derived_fields: Vec<String>,
}

impl ExportService {
    /// Creates an export service over the built-in presets.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, policy: Arc<dyn SharingPolicy>) -> Self {
        Self {
            store,
            policy,
            registry: PresetRegistry::builtin(),
            derived_fields: RecordsConfig::default().derived_fields,
        }
    }

    /// Replaces the preset registry.
    #[must_use]
    pub const fn with_registry(mut self, registry: PresetRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Uses the derived fields named in the record configuration.
    #[must_use]
    pub fn with_records_config(mut self, records: &RecordsConfig) -> Self {
        self.derived_fields.clone_from(&records.derived_fields);
        self
    }

    /// Builds the envelope for `preset_name` as seen by `user`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownPreset`] if the preset does not exist
    /// - the first fetch error of any collection
    #[instrument(skip(self), fields(user = %user))]
    pub fn export(&self, preset_name: &str, user: &UserId) -> Result<ExportEnvelope> {
        let preset = self.registry.get(preset_name)?;
        let data = self.fetch_preset(preset, user)?;
        let envelope = ExportEnvelope::new(preset.name, data);

        let records = envelope.record_count();
        tracing::info!(preset = preset.name, records, "Export assembled");
        metrics::counter!("lifeos_export_total", "preset" => preset.name).increment(1);
        metrics::counter!("lifeos_export_records_total", "preset" => preset.name)
            .increment(records as u64);
        Ok(envelope)
    }

    /// Exports a preset and writes the encoded envelope to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the export, encoding or write fails.
    pub fn export_to_writer<W: Write>(
        &self,
        mut writer: W,
        preset_name: &str,
        user: &UserId,
        format: Format,
    ) -> Result<ExportResult> {
        let envelope = self.export(preset_name, user)?;
        let encoded = format.codec().encode(&envelope)?;
        writer
            .write_all(encoded.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| Error::operation("write_export", e))?;
        Ok(ExportResult::for_envelope(&envelope, format))
    }

    /// Exports a preset into `dir` under the conventional file name.
    ///
    /// The file is only created once the envelope has been fetched and
    /// encoded, so a failed export leaves no partial file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the export, encoding or file write fails.
    pub fn export_to_dir(
        &self,
        dir: &Path,
        preset_name: &str,
        user: &UserId,
        format: Format,
    ) -> Result<ExportResult> {
        let envelope = self.export(preset_name, user)?;
        let encoded = format.codec().encode(&envelope)?;

        std::fs::create_dir_all(dir).map_err(|e| Error::operation("create_export_dir", e))?;
        let path = dir.join(export_filename(
            &envelope.export_type,
            format,
            Utc::now().date_naive(),
        ));
        std::fs::write(&path, encoded).map_err(|e| Error::operation("write_export_file", e))?;
        tracing::info!(path = %path.display(), "Export file written");

        let mut result = ExportResult::for_envelope(&envelope, format);
        result.output_path = Some(path);
        Ok(result)
    }

    /// Fetches every collection of `preset` concurrently.
    fn fetch_preset(
        &self,
        preset: &ExportPreset,
        user: &UserId,
    ) -> Result<BTreeMap<String, Vec<Record>>> {
        let fetched: Vec<Result<Vec<Record>>> = std::thread::scope(|s| {
            let handles: Vec<_> = preset
                .collections
                .iter()
                .map(|&collection| s.spawn(move || self.fetch_collection(collection, user)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(Error::operation("fetch_collection", "fetch thread panicked"))
                    })
                })
                .collect()
        });

        preset
            .collections
            .iter()
            .zip(fetched)
            .map(|(collection, rows)| Ok(((*collection).to_string(), rows?)))
            .collect()
    }

    fn fetch_collection(&self, collection: &str, user: &UserId) -> Result<Vec<Record>> {
        let scope = self.policy.scope(collection);
        let filter = match scope {
            Scope::Shared => FetchScope::All,
            Scope::Owned => FetchScope::OwnedBy(user),
        };

        let mut rows = self.store.fetch(collection, filter).map_err(|e| {
            tracing::warn!(collection, error = %e, "Collection fetch failed");
            e
        })?;
        for row in &mut rows {
            strip_derived_fields(row, &self.derived_fields);
        }

        tracing::debug!(collection, scope = %scope, rows = rows.len(), "Fetched collection");
        Ok(rows)
    }
}
