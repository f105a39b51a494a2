//! Common test utilities for integration tests.
//!
//! This module provides a throwaway workspace with one SQLite database and
//! one migrations directory per target.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::OptionalExtension;
use tempfile::TempDir;
use tidemark::database::{DialectRegistry, DEFAULT_TABLE_NAME};
use tidemark::operations::{MigrationRunner, RunReport};
use tidemark::{Config, Direction, TargetConfig};

/// A temporary directory holding target databases and migration files.
pub struct Workspace {
    root: TempDir,
    pub config: Config,
    pub registry: DialectRegistry,
}

#[allow(dead_code)]
impl Workspace {
    /// Creates a workspace with the given targets, each backed by
    /// `<root>/<name>.db` and `<root>/migrations/<name>/`.
    pub fn new(targets: &[&str]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let mut config = Config {
            migrations_dir: Some(root.path().join("migrations")),
            ..Default::default()
        };
        for name in targets {
            let dsn = root.path().join(format!("{name}.db"));
            config.databases.insert(
                (*name).to_string(),
                TargetConfig::new("sqlite", dsn.to_string_lossy()),
            );
        }
        Self {
            root,
            config,
            registry: DialectRegistry::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn target_dir(&self, target: &str) -> PathBuf {
        self.root.path().join("migrations").join(target)
    }

    /// Writes one migration file for a target, creating its directory.
    pub fn write(&self, target: &str, file: &str, sql: &str) -> PathBuf {
        let dir = self.target_dir(target);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        fs::write(&path, sql).unwrap();
        path
    }

    /// Writes an up/down pair creating and dropping a table.
    pub fn write_table_pair(&self, target: &str, identifier: &str, table: &str) {
        self.write(
            target,
            &format!("{identifier}.up.sql"),
            &format!("CREATE TABLE {table} (id INTEGER PRIMARY KEY);"),
        );
        self.write(
            target,
            &format!("{identifier}.down.sql"),
            &format!("DROP TABLE {table};"),
        );
    }

    pub fn runner(&self) -> MigrationRunner<'_> {
        MigrationRunner::new(&self.config, &self.registry)
    }

    pub fn run(&self, target: Option<&str>, direction: Direction) -> RunReport {
        self.runner().run(target, direction).unwrap()
    }

    pub fn open(&self, target: &str) -> rusqlite::Connection {
        rusqlite::Connection::open(self.root.path().join(format!("{target}.db"))).unwrap()
    }

    /// Identifiers in the target's ledger, in insertion order.
    pub fn ledger(&self, target: &str) -> Vec<String> {
        let conn = self.open(target);
        let mut stmt = conn
            .prepare(&format!(
                "SELECT identifier FROM {DEFAULT_TABLE_NAME} ORDER BY rowid"
            ))
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    pub fn table_exists(&self, target: &str, table: &str) -> bool {
        self.open(target)
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .unwrap()
            .is_some()
    }
}
