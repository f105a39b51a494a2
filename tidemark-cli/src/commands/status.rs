//! Status command implementation.
//!
//! This module implements the `status` command, which lists the applied
//! migrations of each target with their timestamps, followed by the
//! migrations still pending on disk.

use crate::commands::run::ReportFormat;
use crate::error::CliError;
use crate::utils::{format_timestamp, load_configuration, GlobalOptions};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeSet;
use tidemark::database::{DialectRegistry, LedgerEntry};
use tidemark::{Catalog, Config, Direction, TargetResolver};

/// Show applied and pending migrations.
#[derive(Args)]
pub struct StatusCommand {
    /// Only show this target (default: every configured target)
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

#[derive(Serialize)]
struct TargetStatusView {
    target: String,
    applied: Vec<LedgerEntry>,
    pending: Vec<String>,
}

impl StatusCommand {
    /// Execute the status command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let registry = DialectRegistry::default();
        let resolver = TargetResolver::new(&config, &registry);

        let names = match &self.target {
            Some(name) => {
                resolver.target(name)?;
                vec![name.as_str()]
            }
            None => resolver.target_names()?,
        };

        let views = names
            .into_iter()
            .map(|name| target_status(&config, &resolver, name))
            .collect::<Result<Vec<_>, CliError>>()?;

        match self.format {
            ReportFormat::Human => print_human(&views),
            ReportFormat::Json => {
                let json = serde_json::to_string_pretty(&views)
                    .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
                println!("{json}");
            }
        }
        Ok(())
    }
}

fn target_status(
    config: &Config,
    resolver: &TargetResolver<'_>,
    name: &str,
) -> Result<TargetStatusView, CliError> {
    let ledger = resolver.ledger_for(name)?;
    let mut conn = resolver.resolve(name)?;
    ledger.ensure_table(conn.as_mut())?;
    let applied = ledger.list_entries(conn.as_mut())?;

    let catalog = Catalog::scan(&config.migrations_dir().join(name))?;
    let recorded: BTreeSet<&str> = applied.iter().map(|e| e.identifier.as_str()).collect();
    let pending = catalog
        .with_direction(Direction::Up)
        .map(|file| file.identifier())
        .filter(|id| !recorded.contains(id.as_str()))
        .collect();

    Ok(TargetStatusView {
        target: name.to_string(),
        applied,
        pending,
    })
}

fn print_human(views: &[TargetStatusView]) {
    for view in views {
        println!("{}:", view.target);
        if view.applied.is_empty() && view.pending.is_empty() {
            println!("  (no migrations)");
        }
        for entry in &view.applied {
            println!(
                "  applied  {}\t{}",
                entry.identifier,
                format_timestamp(entry.applied_at)
            );
        }
        for identifier in &view.pending {
            println!("  pending  {identifier}");
        }
    }
}
