//! Build script for tidemark-cli.
//!
//! This script generates man pages at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

fn target_arg(required: bool) -> Arg {
    Arg::new("target")
        .long("target")
        .value_name("NAME")
        .required(required)
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_parser(["human", "json"])
        .default_value("human")
        .env("TIDEMARK_OUTPUT_FORMAT")
}

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("tidemark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Apply and revert versioned SQL migrations")
        .long_about(
            "Command-line tool for applying and reverting versioned SQL migrations \
             across one or more configured databases",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file (default: tidemark.yaml or config/db.yaml)")
                .value_name("PATH")
                .global(true),
        )
        .arg(
            Arg::new("dir")
                .long("dir")
                .help("Override the migrations root directory")
                .value_name("PATH")
                .global(true),
        )
        .subcommands(vec![
            Command::new("up")
                .about("Apply every pending migration")
                .long_about("Apply pending migrations to one target, or to every configured target")
                .args([target_arg(false), format_arg()]),
            Command::new("down")
                .about("Revert every applied migration")
                .long_about("Revert applied migrations of one target, or of every configured target")
                .args([target_arg(false), format_arg()]),
            Command::new("apply")
                .about("Apply or revert a single migration file")
                .long_about("Run one .up.sql or .down.sql file and update the ledger")
                .args([
                    target_arg(true),
                    Arg::new("file").long("file").value_name("PATH").required(true),
                ]),
            Command::new("create")
                .about("Create a new migration file pair")
                .long_about("Write empty timestamped .up.sql and .down.sql files for a target")
                .args([
                    target_arg(true),
                    Arg::new("name").long("name").value_name("LABEL").required(true),
                    Arg::new("out").long("out").value_name("PATH"),
                ]),
            Command::new("status")
                .about("Show applied and pending migrations")
                .long_about("List ledger entries with timestamps and the migrations still pending")
                .args([target_arg(false), format_arg()]),
            Command::new("validate")
                .about("Validate a configuration file")
                .long_about("Check a tidemark configuration file for errors")
                .arg(Arg::new("CONFIG_PATH")),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    // Generate main tidemark.1 man page
    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("tidemark.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
