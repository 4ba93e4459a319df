//! Import service.
//!
//! Writes an envelope back to the store. The envelope is validated first;
//! after that the collections are loaded in preset order so parents land
//! before children, each in fixed-size upsert batches. A failing batch is
//! recorded and the load carries on with the next batch.

use crate::config::RecordsConfig;
use crate::io::formats::Format;
use crate::io::policy::SharingPolicy;
use crate::io::presets::PresetRegistry;
use crate::io::validation::{EnvelopeValidator, strip_derived_fields};
use crate::models::{ExportEnvelope, Record, Scope, UserId};
use crate::storage::RecordStore;
use crate::{Error, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// Default number of records per upsert call.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Options for an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Records per upsert call. Never zero.
    pub batch_size: usize,
    /// Validate and count without writing.
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

impl ImportOptions {
    /// Sets the batch size, clamped to at least one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Enables or disables dry run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Progress callback invoked after every batch.
pub type ProgressCallback = Box<dyn Fn(&ImportProgress) + Send + Sync>;

/// Progress information during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    /// Collection being loaded.
    pub collection: String,
    /// Batch just finished (1-indexed).
    pub batch: usize,
    /// Batches in this collection.
    pub batches: usize,
    /// Records attempted so far across all collections.
    pub attempted: usize,
    /// Records in the envelope's declared collections.
    pub total: usize,
}

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Records handed to the store, whether or not their batch succeeded.
    pub imported: usize,
    /// Records in batches the store acknowledged.
    pub written: usize,
    /// One message per failed batch.
    pub errors: Vec<String>,
}

impl ImportResult {
    /// Returns whether every batch succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Service for loading envelopes into the store.
pub struct ImportService {
    store: Arc<dyn RecordStore>,
    policy: Arc<dyn SharingPolicy>,
    validator: EnvelopeValidator,
    options: ImportOptions,
    owner_field: String,
    derived_fields: Vec<String>,
    progress: Option<ProgressCallback>,
}

impl ImportService {
    /// Creates an import service over the built-in presets.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, policy: Arc<dyn SharingPolicy>) -> Self {
        let records = RecordsConfig::default();
        Self {
            store,
            policy,
            validator: EnvelopeValidator::default(),
            options: ImportOptions::default(),
            owner_field: records.owner_field,
            derived_fields: records.derived_fields,
            progress: None,
        }
    }

    /// Replaces the preset registry.
    #[must_use]
    pub const fn with_registry(mut self, registry: PresetRegistry) -> Self {
        self.validator = EnvelopeValidator::new(registry);
        self
    }

    /// Sets the import options.
    #[must_use]
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options.with_batch_size(options.batch_size);
        self
    }

    /// Uses the owner and derived fields named in the record configuration.
    #[must_use]
    pub fn with_records_config(mut self, records: &RecordsConfig) -> Self {
        self.owner_field.clone_from(&records.owner_field);
        self.derived_fields.clone_from(&records.derived_fields);
        self
    }

    /// Installs a per-batch progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Imports an envelope on behalf of `user`.
    ///
    /// Owned collections have their ownership key rewritten to `user`
    /// whatever the file says. Store failures do not abort the import; each
    /// failed batch adds one entry to [`ImportResult::errors`].
    ///
    /// # Errors
    ///
    /// Returns an error only if validation fails, in which case nothing has
    /// been written.
    #[instrument(skip(self, envelope), fields(preset = %envelope.export_type, user = %user))]
    pub fn import(&self, envelope: &ExportEnvelope, user: &UserId) -> Result<ImportResult> {
        let preset = self.validator.validate(envelope)?;
        let total = envelope.record_count();
        let mut result = ImportResult::default();

        for &collection in preset.collections {
            let Some(records) = envelope.data.get(collection) else {
                continue;
            };
            if records.is_empty() {
                continue;
            }

            let scope = self.policy.scope(collection);
            let prepared = self.prepare(records, scope, user);
            result.imported += prepared.len();
            metrics::counter!("lifeos_import_records_total", "collection" => collection.to_string())
                .increment(prepared.len() as u64);

            if self.options.dry_run {
                tracing::info!(collection, records = prepared.len(), "Dry run, skipping writes");
                continue;
            }

            self.load_collection(collection, &prepared, total, &mut result);
        }

        tracing::info!(
            imported = result.imported,
            written = result.written,
            failed_batches = result.errors.len(),
            "Import finished"
        );
        Ok(result)
    }

    /// Decodes and imports a document read from `reader`.
    ///
    /// When `format` is `None` the format is sniffed from the content.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, decoding or validation fails.
    pub fn import_from_reader<R: Read>(
        &self,
        mut reader: R,
        format: Option<Format>,
        user: &UserId,
    ) -> Result<ImportResult> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| Error::operation("read_import", e))?;
        let format = format.unwrap_or_else(|| Format::sniff(&content));
        self.import_str(&content, format, user)
    }

    /// Decodes and imports a file.
    ///
    /// Without an explicit `format` the file extension decides, and content
    /// sniffing covers files with an unknown extension.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, decoding or validation fails.
    pub fn import_from_file(
        &self,
        path: &Path,
        format: Option<Format>,
        user: &UserId,
    ) -> Result<ImportResult> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_import_file", e))?;
        let format = format
            .or_else(|| Format::from_path(path).ok())
            .unwrap_or_else(|| Format::sniff(&content));
        tracing::debug!(path = %path.display(), %format, "Importing file");
        self.import_str(&content, format, user)
    }

    fn import_str(&self, content: &str, format: Format, user: &UserId) -> Result<ImportResult> {
        let envelope = format.codec().decode(content)?;
        self.import(&envelope, user)
    }

    fn prepare(&self, records: &[Record], scope: Scope, user: &UserId) -> Vec<Record> {
        records
            .iter()
            .cloned()
            .map(|mut record| {
                strip_derived_fields(&mut record, &self.derived_fields);
                if scope == Scope::Owned {
                    record.insert(
                        self.owner_field.clone(),
                        Value::String(user.as_str().to_string()),
                    );
                }
                record
            })
            .collect()
    }

    fn load_collection(
        &self,
        collection: &str,
        records: &[Record],
        total: usize,
        result: &mut ImportResult,
    ) {
        let batches = records.len().div_ceil(self.options.batch_size);
        let mut attempted = result.imported - records.len();

        for (index, batch) in records.chunks(self.options.batch_size).enumerate() {
            let number = index + 1;
            attempted += batch.len();
            match self.store.upsert(collection, batch) {
                Ok(()) => {
                    result.written += batch.len();
                    tracing::debug!(collection, batch = number, records = batch.len(), "Batch written");
                },
                Err(e) => {
                    tracing::warn!(collection, batch = number, error = %e, "Batch failed");
                    metrics::counter!(
                        "lifeos_import_batch_failures_total",
                        "collection" => collection.to_string()
                    )
                    .increment(1);
                    result
                        .errors
                        .push(format!("{collection}: batch {number} failed: {e}"));
                },
            }

            if let Some(progress) = &self.progress {
                progress(&ImportProgress {
                    collection: collection.to_string(),
                    batch: number,
                    batches,
                    attempted,
                    total,
                });
            }
        }
    }
}
