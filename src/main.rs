//! Binary entry point for lifeos.
//!
//! This binary provides the CLI interface for LifeOS exports, imports and
//! notifications.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    StateAction, SubscriptionAction, cmd_export, cmd_import, cmd_notify, cmd_presets, cmd_state,
    cmd_subscription,
};
use lifeos::config::LifeosConfig;
use lifeos::observability;
use std::path::PathBuf;
use std::process::ExitCode;

/// LifeOS - export, import and notification tooling for the personal dashboard.
#[derive(Parser)]
#[command(name = "lifeos")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List export presets.
    Presets,

    /// Export a preset to a file.
    Export {
        /// Preset name (see `lifeos presets`).
        #[arg(short, long)]
        preset: String,

        /// Export format: json or xml.
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output directory.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Acting user.
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Import an export file.
    Import {
        /// File to import.
        file: PathBuf,

        /// Input format: json or xml (default: from extension, then content).
        #[arg(short, long)]
        format: Option<String>,

        /// Acting user.
        #[arg(short, long)]
        user: Option<String>,

        /// Validate and count without writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage push subscriptions.
    Subscription {
        #[command(subcommand)]
        action: SubscriptionAction,
    },

    /// Send a notification.
    Notify {
        /// Recipient user.
        #[arg(short, long)]
        recipient: String,

        /// Notification title.
        #[arg(short, long)]
        title: String,

        /// Notification body.
        #[arg(short, long)]
        body: String,

        /// Link opened from the notification.
        #[arg(long)]
        url: Option<String>,

        /// Channels to use (repeatable): push, email.
        #[arg(long = "channel", default_value = "push")]
        channels: Vec<String>,
    },

    /// Inspect or change local state.
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match LifeosConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &LifeosConfig) -> Result<(), Box<dyn std::error::Error>> {
    let result = match cli.command {
        Commands::Presets => cmd_presets(config),

        Commands::Export {
            preset,
            format,
            dir,
            user,
        } => cmd_export(config, &preset, &format, &dir, user.as_deref()),

        Commands::Import {
            file,
            format,
            user,
            dry_run,
        } => cmd_import(config, &file, format.as_deref(), user.as_deref(), dry_run),

        Commands::Subscription { action } => cmd_subscription(config, action),

        Commands::Notify {
            recipient,
            title,
            body,
            url,
            channels,
        } => cmd_notify(config, &recipient, title, body, url, &channels),

        Commands::State { action } => cmd_state(config, action),
    };

    result.map_err(Into::into)
}
