//! QuoteDesk command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment, start logging.
//! - Dispatch subcommands to core services and print plain-text results.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use quotedesk_core::config::{
    ENV_DB_PATH, ENV_IDENTICAL_THRESHOLD, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_SIMILAR_THRESHOLD,
};
use quotedesk_core::{init_logging, AppConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Pure scoring needs no database or config.
    if let Commands::Similarity(args) = &cli.command {
        commands::similarity(args);
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to start logging")?;
    }

    commands::run(cli.command, &config)
}

/// Flags win over environment variables; unset flags fall back to env.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let from_flags = |key: &str| -> Option<String> {
        match key {
            ENV_DB_PATH => cli.db.as_ref().map(|p| p.to_string_lossy().into_owned()),
            ENV_LOG_DIR => cli.log_dir.as_ref().map(|p| p.to_string_lossy().into_owned()),
            ENV_LOG_LEVEL => cli.log_level.clone(),
            ENV_SIMILAR_THRESHOLD => cli.similar_threshold.map(|v| v.to_string()),
            ENV_IDENTICAL_THRESHOLD => cli.identical_threshold.map(|v| v.to_string()),
            _ => None,
        }
    };

    AppConfig::from_lookup(|key| from_flags(key).or_else(|| std::env::var(key).ok()))
        .context("invalid configuration (use --db or QUOTEDESK_DB_PATH)")
}
