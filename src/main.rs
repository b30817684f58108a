//! Binary entry point for kbport.
//!
//! This binary provides the CLI interface for bulk entity store
//! migration.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use kbport::config::KbportConfig;
use kbport::models::{TemporalWindow, WatchSet};
use kbport::observability::{self, InitOptions};
use kbport::services::{EntityService, ExportOrchestrator, ImportOrchestrator};
use std::path::PathBuf;
use std::process::ExitCode;

/// Kbport - bulk export and import for versioned entity knowledge bases.
#[derive(Parser)]
#[command(name = "kbport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Export entities from a store into a portable artifact.
    Export {
        /// Output file for the artifact.
        #[arg(short, long)]
        output: PathBuf,

        /// Optional: export window start (inclusive), epoch millis.
        #[arg(long)]
        from_epoch: Option<i64>,

        /// Optional: export window end (exclusive), epoch millis.
        #[arg(long)]
        to_epoch: Option<i64>,

        /// Store directory to export from (default: from configuration).
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Import a portable artifact into a freshly opened store.
    Import {
        /// Artifact file to import.
        #[arg(short, long)]
        file: PathBuf,

        /// Root directory under which the store folder is created.
        #[arg(long)]
        store_root: Option<PathBuf>,

        /// Folder name to create under the store root.
        #[arg(long)]
        folder: Option<String>,

        /// Entity identifier to trace during import (repeatable).
        #[arg(long = "watch")]
        watch: Vec<String>,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(InitOptions { verbose: cli.verbose }) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands, config: &KbportConfig) -> kbport::Result<()> {
    match command {
        Commands::Export {
            output,
            from_epoch,
            to_epoch,
            store,
        } => {
            let window = TemporalWindow::validate(from_epoch, to_epoch)?;
            let store_dir = store.unwrap_or_else(|| config.store_dir());

            let service = EntityService::new(store_dir);
            let summary = ExportOrchestrator::new(service).run(&output, window).await?;
            println!("Export complete: {summary}");
            Ok(())
        },

        Commands::Import {
            file,
            store_root,
            folder,
            watch,
        } => {
            let root = store_root.unwrap_or_else(|| config.store_root.clone());
            let folder = folder.unwrap_or_else(|| config.folder.clone());
            let store_dir = root.join(folder);

            let watch = WatchSet::build(&watch);
            let summary = ImportOrchestrator::new().run(&file, &store_dir, &watch)?;
            println!("Import complete: {summary}");
            Ok(())
        },
    }
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> kbport::Result<KbportConfig> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return KbportConfig::load_from_file(std::path::Path::new(config_path));
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("KBPORT_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return KbportConfig::load_from_file(std::path::Path::new(&config_path));
        }
    }

    // Otherwise, load from default location
    Ok(KbportConfig::load_default())
}
