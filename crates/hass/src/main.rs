//! Hass - installation analytics reporter
//!
//! # Usage
//!
//! ```bash
//! # Show what would be sent
//! hass analytics show
//!
//! # Opt in to base and statistics reporting
//! hass analytics set base statistics
//!
//! # Submit once, or keep submitting daily
//! hass analytics submit
//! hass --config hass.toml analytics run
//! ```

mod cmd;
mod host;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hass_config::{LogConfig, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Hass - installation analytics reporter
#[derive(Parser, Debug)]
#[command(name = "hass")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect, configure and submit installation analytics
    Analytics(cmd::analytics::AnalyticsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cmd::load_config(cli.config.as_deref())?;

    let filter = resolve_log_filter(cli.log_level.as_deref(), &config.log);
    init_logging(&filter, config.log.format)?;

    match cli.command {
        Command::Analytics(args) => cmd::analytics::run(args, &config).await,
    }
}

/// Resolve the log filter: CLI flag > config file > default "info".
///
/// Per-target directives from the config apply either way.
fn resolve_log_filter(cli_level: Option<&str>, log: &LogConfig) -> String {
    match cli_level {
        Some(level) => LogConfig::filter_with(level, &log.directives),
        None => log.filter(),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(filter: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
    }

    Ok(())
}
