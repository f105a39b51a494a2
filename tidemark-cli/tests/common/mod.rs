//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Configuration and migration file fixtures
//! - Direct inspection of the target databases

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Every command runs with the temporary directory as its working
/// directory, so relative DSNs and the default `migrations/` root resolve
/// inside it.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new, empty test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Create a test environment with a `tidemark.yaml` declaring the given
    /// sqlite targets, each stored in `<name>.db`.
    pub fn with_targets(targets: &[&str]) -> Self {
        let env = Self::new();
        let mut yaml = String::from("databases:\n");
        for name in targets {
            yaml.push_str(&format!(
                "  {name}:\n    dialect: sqlite\n    dsn: {name}.db\n"
            ));
        }
        env.write_file("tidemark.yaml", &yaml);
        env
    }

    /// Get a command builder running in this environment.
    ///
    /// Environment variables that would change configuration are cleared.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tidemark").expect("Failed to find tidemark binary");
        cmd.current_dir(&self.temp_path)
            .env_remove("TIDEMARK_CONFIG")
            .env_remove("TIDEMARK_MIGRATIONS_DIR")
            .env_remove("TIDEMARK_TABLE_PREFIX")
            .env_remove("TIDEMARK_LOG_MODE")
            .env_remove("TIDEMARK_OUTPUT_FORMAT");
        cmd
    }

    /// Start the binary in the background with piped output.
    pub fn spawn(&self, args: &[&str]) -> std::process::Child {
        std::process::Command::new(assert_cmd::cargo::cargo_bin("tidemark"))
            .args(args)
            .current_dir(&self.temp_path)
            .env_remove("TIDEMARK_CONFIG")
            .env_remove("TIDEMARK_MIGRATIONS_DIR")
            .env_remove("TIDEMARK_TABLE_PREFIX")
            .env_remove("TIDEMARK_LOG_MODE")
            .env_remove("TIDEMARK_OUTPUT_FORMAT")
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .expect("Failed to start tidemark")
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file relative to the environment root, creating parents.
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(relative);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("Failed to create parent directory");
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write an up/down pair creating and dropping `table`.
    pub fn write_migration(&self, target: &str, identifier: &str, table: &str) {
        self.write_file(
            &format!("migrations/{target}/{identifier}.up.sql"),
            &format!("CREATE TABLE {table} (id INTEGER PRIMARY KEY);"),
        );
        self.write_file(
            &format!("migrations/{target}/{identifier}.down.sql"),
            &format!("DROP TABLE {table};"),
        );
    }

    /// Identifiers recorded in a target's ledger, sorted.
    pub fn ledger(&self, target: &str) -> Vec<String> {
        let conn = rusqlite::Connection::open(self.temp_path.join(format!("{target}.db")))
            .expect("Failed to open target database");
        let mut stmt = conn
            .prepare("SELECT identifier FROM migrations ORDER BY identifier")
            .expect("Failed to query ledger");
        stmt.query_map([], |row| row.get(0))
            .expect("Failed to read ledger")
            .collect::<Result<_, _>>()
            .expect("Failed to read ledger row")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
