//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading and timestamp formatting.

use crate::error::CliError;
use chrono::{DateTime, Local, Utc};
use std::path::PathBuf;
use tidemark::{CancellationToken, Config, ConfigBuilder};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)] // `verbose` is consumed by the logger before dispatch
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Explicit configuration file.
    pub config: Option<PathBuf>,

    /// Override the migrations root directory.
    pub dir: Option<PathBuf>,

    /// Cancellation signal handed to every run.
    pub cancel: CancellationToken,
}

/// Load the configuration.
///
/// Sources, from highest to lowest priority:
/// 1. Global options (`--dir`)
/// 2. Environment variables
/// 3. Configuration file (`--config`, `TIDEMARK_CONFIG`, or discovered)
/// 4. Built-in defaults
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();

    if let Some(path) = &global.config {
        builder = builder.with_config_file(path);
    }
    if let Some(dir) = &global.dir {
        builder = builder.with_migrations_dir(dir);
    }

    builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Cancel `cancel` on SIGINT or SIGTERM.
///
/// The first signal lets the migration in progress roll back before the
/// process exits with code 130; a second one exits immediately.
pub fn install_signal_handler(cancel: &CancellationToken) -> Result<(), CliError> {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130);
        }
        token.cancel();
    })
    .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Format a ledger timestamp for display in local time.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
