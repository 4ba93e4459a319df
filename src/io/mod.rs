//! Export/import subsystem.
//!
//! Turns the rows of a named preset into a portable envelope and loads such
//! envelopes back into the store.
//!
//! # Architecture
//!
//! - **Presets** name the collections exported together, parents first
//! - **Policy** decides which collections are shared by every user
//! - **Formats** encode envelopes as JSON or the `LifeOSExport` XML dialect
//! - **Validation** rejects unknown presets and foreign collections
//! - **Services** run the fetch and the batched upsert
//!
//! # Supported Formats
//!
//! | Format | Import | Export | Notes |
//! |--------|--------|--------|-------|
//! | JSON | ✓ | ✓ | Pretty-printed, two-space indent |
//! | XML | ✓ | ✓ | `LifeOSExport` root, `<item>` per record |
//!
//! # Examples
//!
//! ```rust,ignore
//! use lifeos::io::{ExportService, Format, ImportService};
//! use lifeos::UserId;
//!
//! let user = UserId::new("u1");
//! let result = export.export_to_dir(dir, "tasks", &user, Format::Xml)?;
//! let loaded = import.import_from_file(&result.output_path.unwrap(), None, &user)?;
//! println!("{} records, {} failed batches", loaded.imported, loaded.errors.len());
//! ```

pub mod formats;
pub mod policy;
pub mod presets;
pub mod services;
pub mod traits;
pub mod validation;

pub use formats::{Format, export_filename};
pub use policy::{SharedCollections, SharingPolicy};
pub use presets::{BUILTIN_PRESETS, PresetRegistry};
pub use services::{
    ExportResult, ExportService, ImportOptions, ImportProgress, ImportResult, ImportService,
};
pub use traits::EnvelopeCodec;
pub use validation::EnvelopeValidator;
