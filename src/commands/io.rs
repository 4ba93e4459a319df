//! Import and export command handlers.

use std::path::Path;
use std::sync::Arc;

use super::{acting_user, open_store};
use lifeos::Result;
use lifeos::config::LifeosConfig;
use lifeos::io::{
    ExportService, Format, ImportOptions, ImportProgress, ImportService, PresetRegistry,
    SharingPolicy,
};

/// Executes the presets command.
pub fn cmd_presets(config: &LifeosConfig) -> Result<()> {
    let policy = config.sharing_policy();

    for preset in PresetRegistry::builtin().list() {
        println!("{:<16} {}", preset.name, preset.label);
        for collection in preset.collections {
            println!("    {collection:<20} {}", policy.scope(collection));
        }
    }

    Ok(())
}

/// Executes the export command.
pub fn cmd_export(
    config: &LifeosConfig,
    preset: &str,
    format: &str,
    dir: &Path,
    user: Option<&str>,
) -> Result<()> {
    let format: Format = format.parse()?;
    let user = acting_user(config, user)?;

    let service = ExportService::new(open_store(config)?, Arc::new(config.sharing_policy()))
        .with_records_config(&config.records);
    let result = service.export_to_dir(dir, preset, &user, format)?;

    println!("Export completed:");
    println!("  Records:     {}", result.exported);
    println!("  Collections: {}", result.collections);
    if let Some(path) = result.output_path {
        println!("  File:        {}", path.display());
    }

    Ok(())
}

/// Executes the import command.
pub fn cmd_import(
    config: &LifeosConfig,
    file: &Path,
    format: Option<&str>,
    user: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let format = format.map(str::parse::<Format>).transpose()?;
    let user = acting_user(config, user)?;

    let options = ImportOptions::default()
        .with_batch_size(config.import.batch_size)
        .with_dry_run(dry_run);
    let service = ImportService::new(open_store(config)?, Arc::new(config.sharing_policy()))
        .with_records_config(&config.records)
        .with_options(options)
        .with_progress(Box::new(|progress: &ImportProgress| {
            tracing::debug!(
                collection = %progress.collection,
                batch = progress.batch,
                batches = progress.batches,
                attempted = progress.attempted,
                total = progress.total,
                "Import progress"
            );
        }));

    let result = service.import_from_file(file, format, &user)?;

    if dry_run {
        println!("Dry run completed (no changes made):");
    } else {
        println!("Import completed:");
    }
    println!("  Imported: {}", result.imported);
    println!("  Written:  {}", result.written);

    if !result.errors.is_empty() {
        println!();
        println!("Errors ({}):", result.errors.len());
        for error in result.errors.iter().take(10) {
            println!("  - {error}");
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more", result.errors.len() - 10);
        }
    }

    Ok(())
}
