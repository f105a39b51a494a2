//! Apply command implementation.
//!
//! This module implements the `apply` command, which runs a single
//! migration file against one target. The direction comes from the file's
//! suffix, and the ledger is updated in the same transaction.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::Args;
use std::path::PathBuf;
use tidemark::database::DialectRegistry;
use tidemark::{apply_file, TargetResolver};

/// Apply one migration file to a target.
#[derive(Args)]
pub struct ApplyCommand {
    /// Target to apply the file to
    #[arg(long, value_name = "NAME")]
    pub target: String,

    /// Migration file (`<key>_<name>.up.sql` or `.down.sql`)
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,
}

impl ApplyCommand {
    /// Execute the apply command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if !self.file.is_file() {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                self.file.display()
            )));
        }

        let config = load_configuration(global)?;
        let registry = DialectRegistry::default();
        let resolver = TargetResolver::new(&config, &registry);

        let ledger = resolver.ledger_for(&self.target)?;
        let mut conn = resolver.resolve(&self.target)?;

        let item = apply_file(conn.as_mut(), &ledger, &self.file, &global.cancel)?;

        if !global.quiet {
            println!("{}: {}", self.target, item.description());
        }
        Ok(())
    }
}
