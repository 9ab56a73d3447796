//! Transparency portal person search.
//!
//! Main entry point for the `transparency` CLI.

mod cli;
mod cmd_cache;
mod cmd_search;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transparency_browser::{BrowserManager, BrowserManagerConfig};
use transparency_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Initialize tracing with console and file output.
///
/// Log files rotate daily in the configured log directory.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&logging.dir)
        .with_context(|| format!("Failed to create log directory {}", logging.dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("transparency")
        .filename_suffix("log")
        .max_log_files(logging.max_files)
        .build(&logging.dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn validate_config(config: &Config) -> anyhow::Result<()> {
    let warnings = ConfigValidator::validate(config)
        .into_result()
        .context("Invalid configuration")?;
    for warning in warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    Ok(())
}

/// Save a full-page screenshot and the error chain for post-mortem.
async fn write_crash_artifacts(manager: &BrowserManager, config: &Config, err: &anyhow::Error) {
    let paths = &config.paths;

    match manager.capture_page().await {
        Ok(png) => {
            if let Err(e) = write_file(&paths.error_screenshot, &png) {
                warn!("Failed to save error screenshot: {}", e);
            }
        }
        Err(e) => warn!("No error screenshot taken: {}", e),
    }

    if let Err(e) = write_file(&paths.error_log, format!("{:?}\n", err).as_bytes()) {
        warn!("Failed to save error log: {}", e);
    }
}

fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging)?;
    validate_config(&config)?;

    info!("Starting transparency v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::ClearCache = cli.command {
        let removed = cmd_cache::clear_cache(&config.paths.cache_dir)?;
        info!("Removed {} cached file(s)", removed);
        return Ok(());
    }

    let manager = BrowserManager::new(BrowserManagerConfig::from_config(&config));

    let result = match cli.command {
        Commands::Search(args) => cmd_search::run_search(&manager, &config, args).await,
        Commands::CaptureSession => cmd_cache::capture_session(&manager, &config).await,
        Commands::ClearCache => Ok(()),
    };

    if let Err(ref e) = result {
        error!("{:#}", e);
        write_crash_artifacts(&manager, &config, e).await;
    }

    if let Err(e) = manager.shutdown_chrome().await {
        warn!("Failed to shut down browser: {}", e);
    }

    result
}
