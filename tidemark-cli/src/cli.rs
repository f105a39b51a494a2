//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{ApplyCommand, CreateCommand, RunCommand, StatusCommand, ValidateCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for applying and reverting versioned SQL migrations.
#[derive(Parser)]
#[command(name = "tidemark")]
#[command(version, about = "Apply and revert versioned SQL migrations", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: tidemark.yaml or config/db.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Override the migrations root directory
    #[arg(long, value_name = "PATH", global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Apply every pending migration
    Up(RunCommand),

    /// Revert every applied migration
    Down(RunCommand),

    /// Apply or revert a single migration file
    Apply(ApplyCommand),

    /// Create a new migration file pair
    Create(CreateCommand),

    /// Show applied and pending migrations
    Status(StatusCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_up_without_target() {
        let cli = Cli::try_parse_from(["tidemark", "up"]).unwrap();
        match cli.command {
            Command::Up(cmd) => assert!(cmd.target.is_none()),
            _ => panic!("expected up"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tidemark", "down", "--target", "main", "--dir", "db", "--quiet"])
                .unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.dir, Some(PathBuf::from("db")));
        match cli.command {
            Command::Down(cmd) => assert_eq!(cmd.target.as_deref(), Some("main")),
            _ => panic!("expected down"),
        }
    }

    #[test]
    fn test_apply_requires_target_and_file() {
        assert!(Cli::try_parse_from(["tidemark", "apply", "--file", "1_a.up.sql"]).is_err());
        assert!(Cli::try_parse_from(["tidemark", "apply", "--target", "main"]).is_err());
    }
}
