//! Create command implementation.
//!
//! This module implements the `create` command, which scaffolds an empty
//! up/down migration pair for a target.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::Args;
use std::path::PathBuf;
use tidemark::operations::{create_migration, next_sequence_key};

/// Create a new migration file pair.
#[derive(Args)]
pub struct CreateCommand {
    /// Target the migration belongs to
    #[arg(long, value_name = "NAME")]
    pub target: String,

    /// Label for the migration (letters, digits, `_` and `-`)
    #[arg(long, value_name = "LABEL")]
    pub name: String,

    /// Migrations root to write into (default: the configured directory)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

impl CreateCommand {
    /// Execute the create command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let out_dir = match self.out {
            Some(dir) => dir,
            None => load_configuration(global)?.migrations_dir(),
        };

        let pair = create_migration(&out_dir, &self.target, &self.name, &next_sequence_key())?;

        if !global.quiet {
            println!("{}", pair.up.display());
            println!("{}", pair.down.display());
        }
        Ok(())
    }
}
