//! Main entry point for the tidemark CLI.
//!
//! This is the command-line interface for the tidemark migration runner.
//! It provides commands for managing schema migrations:
//! - `up`: Apply pending migrations
//! - `down`: Revert applied migrations
//! - `apply`: Run a single migration file
//! - `create`: Scaffold a new migration pair
//! - `status`: Show applied and pending migrations
//! - `validate`: Validate a configuration file

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use tidemark::{CancellationToken, Direction};
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    tidemark::init_logger(cli.verbose, cli.quiet);

    // SIGINT/SIGTERM cancel the run so the open transaction rolls back
    let cancel = CancellationToken::new();
    if let Err(e) = utils::install_signal_handler(&cancel) {
        eprintln!("Warning: cannot install signal handler: {e}");
    }

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        dir: cli.dir,
        cancel,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Up(cmd) => cmd.execute(Direction::Up, &global),
        cli::Command::Down(cmd) => cmd.execute(Direction::Down, &global),
        cli::Command::Apply(cmd) => cmd.execute(&global),
        cli::Command::Create(cmd) => cmd.execute(&global),
        cli::Command::Status(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_out_of_sync() {
                eprintln!(
                    "Warning: the ledger may not match the database schema; manual intervention is required"
                );
            }
            std::process::exit(e.exit_code());
        }
    }
}
