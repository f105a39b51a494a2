//! Command to validate a tidemark configuration file.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use std::path::PathBuf;
use tidemark::config::{ConfigLoader, ConfigValidator};
use tidemark::Error;

/// Validate a tidemark configuration file.
#[derive(Args)]
pub struct ValidateCommand {
    /// Configuration file to validate (default: the discovered file)
    #[arg(value_name = "CONFIG_PATH")]
    pub config_path: Option<PathBuf>,
}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Find the file: positional argument, then --config, then discovery
        let working_dir = std::env::current_dir()?;
        let path = self
            .config_path
            .or_else(|| global.config.clone())
            .or_else(|| ConfigLoader::discover(&working_dir))
            .ok_or_else(|| {
                CliError::InvalidArguments(format!(
                    "No configuration file found in {}",
                    working_dir.display()
                ))
            })?;

        if !path.exists() {
            return Err(CliError::InvalidArguments(format!(
                "File not found: {}",
                path.display()
            )));
        }

        // 2. Parse the file
        let config = match ConfigLoader::load_file(&path) {
            Ok(c) => c,
            Err(Error::Configuration(e)) => {
                eprintln!("Parse error: {e}");
                return Err(CliError::SemanticFailure(
                    "Configuration file is invalid".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        // 3. Validate the configuration
        match ConfigValidator::validate(&config) {
            Ok(()) => {
                println!("Configuration is valid");
                Ok(())
            }
            Err(e) => {
                eprintln!("Validation error: {e}");
                Err(CliError::SemanticFailure(
                    "Configuration validation failed".to_string(),
                ))
            }
        }
    }
}
