// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! tidywatch: keeps a downloads folder sorted
//!
//! Runs as a long-lived background process by default; `once`, `classify`,
//! `categories` and `config` are one-shot helpers.

use clap::{Parser, Subcommand};
use std::future::pending;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use tidywatch::classifier::classify;
use tidywatch::config::{LogConfig, TriggerMode};
use tidywatch::engine::{EngineSettings, TriggerEngine};
use tidywatch::fs::OsFs;
use tidywatch::logging;
use tidywatch::recorder::{Recorder, TracingRecorder};
use tidywatch::watcher::ChangeWatcher;
use tidywatch::{AppConfig, Organizer, Result};

/// tidywatch CLI - sorts a downloads folder into category subfolders
#[derive(Parser, Debug)]
#[command(name = "tidywatch")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Sorts a downloads folder into category subfolders by extension", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keep organizing until stopped (default)
    Run {
        /// Directory to organize (overrides config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Which triggers to use (overrides config)
        #[arg(short, long, value_enum)]
        mode: Option<TriggerMode>,

        /// Seconds between full rescans
        #[arg(long)]
        interval: Option<u64>,

        /// Seconds a changed file must stay quiet before it is moved
        #[arg(long)]
        debounce: Option<u64>,

        /// Log what would be moved without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the initial pass over existing files
        #[arg(long)]
        no_startup_scan: bool,
    },

    /// Organize the directory once and exit
    Once {
        /// Directory to organize (overrides config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Log what would be moved without moving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which category each file name would go to
    Classify {
        /// File names to classify
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List configured categories and their extensions
    Categories,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

/// Overrides for the `run` command
#[derive(Debug, Default)]
struct RunOptions {
    dir: Option<PathBuf>,
    mode: Option<TriggerMode>,
    interval: Option<u64>,
    debounce: Option<u64>,
    dry_run: bool,
    no_startup_scan: bool,
}

/// Only the organizing commands write to the log file
fn uses_log_file(command: &Option<Commands>) -> bool {
    matches!(command, None | Some(Commands::Run { .. }) | Some(Commands::Once { .. }))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    let log_config = if uses_log_file(&cli.command) {
        config.logging.clone()
    } else {
        LogConfig {
            file: None,
            ..config.logging.clone()
        }
    };
    let filter = logging::filter_for(cli.verbose, cli.trace, cli.quiet);
    let _guard = match logging::init(&log_config, filter) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    if !cli.quiet {
        info!("tidywatch v{}", env!("CARGO_PKG_VERSION"));
    }

    let result = match cli.command {
        Some(Commands::Run { dir, mode, interval, debounce, dry_run, no_startup_scan }) => {
            let options = RunOptions { dir, mode, interval, debounce, dry_run, no_startup_scan };
            run_daemon(config, options).await
        }
        Some(Commands::Once { dir, dry_run }) => run_once(config, dir, dry_run),
        Some(Commands::Classify { names }) => run_classify(&config, &names),
        Some(Commands::Categories) => run_categories(&config),
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        None => {
            // Default: run until stopped
            run_daemon(config, RunOptions::default()).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn build_organizer(config: &AppConfig, dir: Option<PathBuf>, dry_run: bool) -> Result<Organizer> {
    let base_dir = match dir {
        Some(dir) => dir,
        None => config.resolve_base_dir()?,
    };
    let categories = Arc::new(config.category_map()?);
    let recorder: Arc<dyn Recorder> = Arc::new(TracingRecorder);

    info!("Organizing: {:?} ({} categories)", base_dir, categories.len());
    if dry_run {
        warn!("DRY RUN MODE - files will not be moved");
    }

    Ok(Organizer::new(base_dir, categories, Arc::new(OsFs), recorder).with_dry_run(dry_run))
}

/// Provision folders, then organize until Ctrl+C / SIGTERM
async fn run_daemon(mut config: AppConfig, options: RunOptions) -> Result<()> {
    if let Some(mode) = options.mode {
        config.triggers.mode = mode;
    }
    if let Some(secs) = options.interval {
        config.triggers.interval_secs = secs;
    }
    if let Some(secs) = options.debounce {
        config.triggers.debounce_secs = secs;
    }
    if options.no_startup_scan {
        config.triggers.scan_on_startup = false;
    }
    config.triggers.validate()?;

    let organizer = build_organizer(&config, options.dir, options.dry_run)?;
    organizer.provision()?;

    let settings = EngineSettings::from(&config.triggers);

    // Dropping the watcher ends the change feed, so it lives for the whole run
    let (_watcher, changes) = if settings.debounce.is_some() {
        let recorder: Arc<dyn Recorder> = Arc::new(TracingRecorder);
        let (watcher, rx) = ChangeWatcher::start(organizer.base_dir(), recorder)?;
        (Some(watcher), Some(rx))
    } else {
        (None, None)
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_shutdown_listener(shutdown_tx);

    info!("Organizer active. Press Ctrl+C to stop.");
    TriggerEngine::new(organizer, settings)
        .run(changes, shutdown_rx)
        .await;

    info!("tidywatch stopped.");
    Ok(())
}

fn spawn_shutdown_listener(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = terminate => info!("Received SIGTERM, shutting down..."),
        }

        let _ = shutdown_tx.send(true);
    });
}

/// Single pass, like a cron job
fn run_once(config: AppConfig, dir: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let organizer = build_organizer(&config, dir, dry_run)?;
    organizer.provision()?;

    let summary = organizer.organize_pass()?;
    println!(
        "Scanned {} files: {} moved, {} failed, {} left in place",
        summary.scanned, summary.moved, summary.failed, summary.unmatched
    );
    Ok(())
}

fn run_classify(config: &AppConfig, names: &[String]) -> Result<()> {
    let map = config.category_map()?;
    for name in names {
        println!("{}: {}", name, classify(&map, name).unwrap_or("-"));
    }
    Ok(())
}

fn run_categories(config: &AppConfig) -> Result<()> {
    let map = config.category_map()?;
    println!("Categories (first match wins):");
    for category in &map {
        println!("  {:<12} {}", category.name(), category.extensions().join(" "));
    }
    for (ext, winner, shadowed) in map.overlaps() {
        println!("  note: {} goes to {}, not {}", ext, winner, shadowed);
    }
    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            match config.resolve_base_dir() {
                Ok(dir) => println!("  Base directory: {:?}", dir),
                Err(e) => println!("  Base directory: {}", e),
            }
            println!("  Trigger mode: {:?}", config.triggers.mode);
            println!("  Categories: {}", config.categories.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["tidywatch"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
        assert!(uses_log_file(&cli.command));
    }

    #[test]
    fn test_cli_run_command() {
        let cli = Cli::try_parse_from([
            "tidywatch", "run", "--dir", "/tmp/dl", "--mode", "watch", "--debounce", "2", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Run { dir, mode, debounce, dry_run, interval, .. }) => {
                assert_eq!(dir, Some(PathBuf::from("/tmp/dl")));
                assert_eq!(mode, Some(TriggerMode::Watch));
                assert_eq!(debounce, Some(2));
                assert_eq!(interval, None);
                assert!(dry_run);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_classify_requires_names() {
        assert!(Cli::try_parse_from(["tidywatch", "classify"]).is_err());
        let cli = Cli::try_parse_from(["tidywatch", "classify", "a.jpg", "b"]).unwrap();
        assert!(!uses_log_file(&cli.command));
    }

    #[test]
    fn test_zero_interval_override_rejected() {
        let options = RunOptions {
            interval: Some(0),
            mode: Some(TriggerMode::Interval),
            ..RunOptions::default()
        };
        let err = tokio_test::block_on(run_daemon(AppConfig::default(), options)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
