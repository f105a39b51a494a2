//! `up` and `down` command implementation.
//!
//! Both commands run every outstanding migration for one target, or for
//! every configured target when `--target` is omitted, and print a report.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::{Args, ValueEnum};
use tidemark::database::DialectRegistry;
use tidemark::operations::MigrationRunner;
use tidemark::output::OutputFormat;
use tidemark::Direction;

/// Run outstanding migrations in one direction.
#[derive(Args)]
pub struct RunCommand {
    /// Only migrate this target (default: every configured target)
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "human",
        env = "TIDEMARK_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: ReportFormat,
}

/// Output format for run reports.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per target
    Human,
    /// JSON document
    Json,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Human => OutputFormat::Human,
            ReportFormat::Json => OutputFormat::Json,
        }
    }
}

impl RunCommand {
    /// Execute the command in `direction`.
    pub fn execute(self, direction: Direction, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let registry = DialectRegistry::default();

        let runner =
            MigrationRunner::new(&config, &registry).with_cancellation(global.cancel.clone());
        let report = runner.run(self.target.as_deref(), direction)?;

        let output = OutputFormat::from(self.format)
            .create_formatter()
            .format(&report)?;
        println!("{output}");

        report.into_result()?;
        Ok(())
    }
}
