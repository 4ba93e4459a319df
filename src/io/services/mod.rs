//! Export and import service implementations.

pub mod export;
pub mod import;

pub use export::{ExportResult, ExportService};
pub use import::{
    DEFAULT_BATCH_SIZE, ImportOptions, ImportProgress, ImportResult, ImportService,
    ProgressCallback,
};
