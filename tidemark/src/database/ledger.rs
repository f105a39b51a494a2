//! The ledger table recording which migrations are applied.
//!
//! Each target holds one ledger table with one row per applied migration:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS migrations (
//!     identifier VARCHAR(255) NOT NULL PRIMARY KEY,
//!     applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
//! )
//! ```
//!
//! Inserts and deletes always run inside the transaction of the migration
//! they describe, so a change-set and its ledger row commit or roll back
//! together.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

use super::driver::{Connection, Transaction};

/// Ledger table name used when a target does not override it.
pub const DEFAULT_TABLE_NAME: &str = "migrations";

// Fractional seconds are optional; PostgreSQL renders them, SQLite does not.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Checks that a table name is a plain SQL identifier, optionally qualified
/// by a schema (`schema.table`).
///
/// Table names are interpolated into SQL text, so anything else is refused.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the name is empty or contains characters
/// other than ASCII letters, digits, and underscores, or starts with a digit.
///
/// # Examples
///
/// ```
/// use tidemark::database::validate_table_name;
///
/// assert!(validate_table_name("migrations").is_ok());
/// assert!(validate_table_name("public.schema_history").is_ok());
/// assert!(validate_table_name("1table").is_err());
/// assert!(validate_table_name("m; DROP TABLE users").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
        return Err(Error::Validation {
            field: "table_name".into(),
            message: format!("'{name}' is not a valid SQL table identifier"),
        });
    }
    Ok(())
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// The applied migration identifier.
    pub identifier: String,
    /// When the migration was applied.
    pub applied_at: DateTime<Utc>,
}

/// Accessor for one target's ledger table.
///
/// # Examples
///
/// ```
/// use tidemark::database::{Ledger, SqliteConnection};
///
/// let mut conn = SqliteConnection::open_in_memory().unwrap();
/// let ledger = Ledger::new("migrations").unwrap();
/// ledger.ensure_table(&mut conn).unwrap();
///
/// assert!(ledger.list_applied(&mut conn).unwrap().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    table: String,
    table_options: Option<String>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE_NAME.to_string(),
            table_options: None,
        }
    }
}

impl Ledger {
    /// Creates a ledger accessor for the given table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the table name is not a plain SQL
    /// identifier.
    pub fn new(table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self {
            table,
            table_options: None,
        })
    }

    /// Appends dialect-specific options after the `CREATE TABLE` columns.
    #[must_use]
    pub fn with_table_options(mut self, options: Option<String>) -> Self {
        self.table_options = options.filter(|o| !o.trim().is_empty());
        self
    }

    /// The ledger table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Creates the ledger table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the statement fails.
    pub fn ensure_table(&self, conn: &mut dyn Connection) -> Result<()> {
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             identifier VARCHAR(255) NOT NULL PRIMARY KEY, \
             applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP)",
            self.table
        );
        if let Some(options) = &self.table_options {
            sql.push(' ');
            sql.push_str(options);
        }

        conn.execute_batch(&sql).map_err(|e| Error::Schema {
            table: self.table.clone(),
            source: Box::new(e),
        })?;
        log::debug!("Ledger table '{}' is ready", self.table);
        Ok(())
    }

    /// Returns every applied identifier.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails.
    pub fn list_applied(&self, conn: &mut dyn Connection) -> Result<BTreeSet<String>> {
        let rows = conn.query_rows(&format!("SELECT identifier FROM {}", self.table))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect())
    }

    /// Returns every ledger row, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails, or
    /// [`Error::Validation`] if a timestamp cannot be parsed.
    pub fn list_entries(&self, conn: &mut dyn Connection) -> Result<Vec<LedgerEntry>> {
        let rows = conn.query_rows(&format!(
            "SELECT identifier, applied_at FROM {} ORDER BY identifier",
            self.table
        ))?;

        rows.into_iter()
            .map(|row| match row.as_slice() {
                [identifier, applied_at] => Ok(LedgerEntry {
                    identifier: identifier.clone(),
                    applied_at: parse_timestamp(applied_at)?,
                }),
                _ => Err(Error::Validation {
                    field: self.table.clone(),
                    message: format!("expected 2 columns, found {}", row.len()),
                }),
            })
            .collect()
    }

    /// Inserts the row for a migration inside its transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Duplicate`] if the identifier is already recorded,
    /// or the driver error if the insert fails.
    pub fn record_applied(&self, tx: &mut dyn Transaction, identifier: &str) -> Result<()> {
        let exists = tx.exists(
            &format!("SELECT 1 FROM {} WHERE identifier = ?", self.table),
            &[identifier],
        )?;
        if exists {
            return Err(Error::Duplicate {
                identifier: identifier.to_string(),
            });
        }

        tx.execute(
            &format!("INSERT INTO {} (identifier) VALUES (?)", self.table),
            &[identifier],
        )?;
        Ok(())
    }

    /// Deletes the row for a migration inside its transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecorded`] if no row was deleted, or the driver
    /// error if the delete fails.
    pub fn record_reverted(&self, tx: &mut dyn Transaction, identifier: &str) -> Result<()> {
        let deleted = tx.execute(
            &format!("DELETE FROM {} WHERE identifier = ?", self.table),
            &[identifier],
        )?;
        if deleted == 0 {
            return Err(Error::NotRecorded {
                identifier: identifier.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map(|dt| dt.and_utc())
        })
        .map_err(|e| Error::Validation {
            field: "applied_at".into(),
            message: format!("cannot parse '{value}': {e}"),
        })
}
