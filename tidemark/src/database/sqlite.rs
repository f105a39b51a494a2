//! `SQLite` driver backed by rusqlite.

use std::path::Path;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, OpenFlags, OptionalExtension, TransactionBehavior};

use crate::cancel::CancelHook;
use crate::config::TargetConfig;
use crate::error::{Error, Result};

use super::driver::{Connection, Transaction};

/// Dialect name the `SQLite` driver registers under.
pub const SQLITE_DIALECT: &str = "sqlite";

const MEMORY_DSN: &str = ":memory:";
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// A [`Connection`] to a `SQLite` database file.
///
/// # Examples
///
/// ```
/// use tidemark::database::{Connection, SqliteConnection};
///
/// let mut conn = SqliteConnection::open_in_memory().unwrap();
/// conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1);").unwrap();
/// let rows = conn.query_rows("SELECT x FROM t").unwrap();
/// assert_eq!(rows, vec![vec!["1".to_string()]]);
/// ```
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens a database from a DSN.
    ///
    /// The DSN is a file path, optionally prefixed with `sqlite://` or
    /// `sqlite:`, or `:memory:`. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened.
    pub fn open(dsn: &str) -> Result<Self> {
        let path = dsn
            .strip_prefix("sqlite://")
            .or_else(|| dsn.strip_prefix("sqlite:"))
            .unwrap_or(dsn);
        if path == MEMORY_DSN {
            return Self::open_in_memory();
        }

        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = rusqlite::Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        log::debug!("Opened sqlite database {}", path.display());
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Returns a reference to the underlying rusqlite connection.
    #[must_use]
    pub const fn connection(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> &str {
        SQLITE_DIALECT
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..columns)
                    .map(|i| row.get_ref(i).map(render))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn begin(&mut self) -> Result<Box<dyn Transaction + '_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(Box::new(SqliteTransaction { tx }))
    }

    fn interrupt_hook(&self) -> Option<CancelHook> {
        let handle = self.conn.get_interrupt_handle();
        Some(Box::new(move || handle.interrupt()))
    }
}

/// An immediate-mode `SQLite` transaction.
struct SqliteTransaction<'c> {
    tx: rusqlite::Transaction<'c>,
}

impl Transaction for SqliteTransaction<'_> {
    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.tx.execute_batch(sql)?;
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize> {
        Ok(self.tx.execute(sql, params_from_iter(params.iter()))?)
    }

    fn exists(&mut self, sql: &str, params: &[&str]) -> Result<bool> {
        let found = self
            .tx
            .query_row(sql, params_from_iter(params.iter()), |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn is_active(&self) -> bool {
        !self.tx.is_autocommit()
    }

    // COMMIT and ROLLBACK are issued directly so a failed commit leaves the
    // transaction in place for an explicit rollback. Once either succeeds the
    // connection is back in autocommit mode and dropping `tx` does nothing.
    fn commit(&mut self) -> Result<()> {
        self.tx.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        // Interrupts and errors such as SQLITE_FULL or SQLITE_IOERR make
        // SQLite roll the transaction back itself.
        if self.tx.is_autocommit() {
            log::debug!("Transaction already rolled back by sqlite");
            return Ok(());
        }
        self.tx.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

/// Connection factory for the `sqlite` dialect.
///
/// # Errors
///
/// Returns [`Error::Connection`] tagged with the target name if the database
/// cannot be opened.
pub fn connect(target: &str, config: &TargetConfig) -> Result<Box<dyn Connection>> {
    let conn = SqliteConnection::open(&config.dsn).map_err(|e| Error::Connection {
        target: target.to_string(),
        source: Box::new(e),
    })?;
    Ok(Box::new(conn))
}
