//! `PostgreSQL` driver backed by the blocking `postgres` client.
//!
//! Enabled with the `postgres` cargo feature. Connections are made without
//! TLS. Statements handed to [`Transaction::execute`] use `?` placeholders and
//! are renumbered to `$1, $2, ...` before they reach the server.

use std::fmt;

use postgres::types::ToSql;
use postgres::{Client, NoTls, SimpleQueryMessage};

use crate::cancel::CancelHook;
use crate::config::TargetConfig;
use crate::error::{Error, Result};

use super::driver::{Connection, Transaction};

/// Dialect name the `PostgreSQL` driver registers under.
pub const POSTGRES_DIALECT: &str = "postgres";

/// A [`Connection`] to a `PostgreSQL` server.
pub struct PostgresConnection {
    client: Client,
}

impl PostgresConnection {
    /// Connects using a libpq-style DSN, either key/value
    /// (`host=localhost user=app dbname=app`) or a `postgres://` URL.
    ///
    /// # Errors
    ///
    /// Returns the client error if the server cannot be reached or rejects
    /// the login.
    pub fn open(dsn: &str) -> Result<Self> {
        let client = Client::connect(dsn, NoTls)?;
        log::debug!("Opened postgres connection");
        Ok(Self { client })
    }
}

impl fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConnection")
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection for PostgresConnection {
    fn dialect(&self) -> &str {
        POSTGRES_DIALECT
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    // The simple query protocol returns every column as text.
    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>> {
        let rows = self
            .client
            .simple_query(sql)?
            .into_iter()
            .filter_map(|message| match message {
                SimpleQueryMessage::Row(row) => Some(
                    (0..row.len())
                        .map(|i| row.get(i).unwrap_or_default().to_string())
                        .collect(),
                ),
                _ => None,
            })
            .collect();
        Ok(rows)
    }

    fn begin(&mut self) -> Result<Box<dyn Transaction + '_>> {
        self.client.batch_execute("BEGIN")?;
        Ok(Box::new(PostgresTransaction {
            client: &mut self.client,
            active: true,
        }))
    }

    fn interrupt_hook(&self) -> Option<CancelHook> {
        let token = self.client.cancel_token();
        Some(Box::new(move || {
            if let Err(e) = token.cancel_query(NoTls) {
                log::warn!("Cannot cancel the running postgres query: {e}");
            }
        }))
    }
}

/// A transaction opened with an explicit `BEGIN`.
///
/// A `COMMIT` issued by a change-set is not visible to the client, so
/// [`Transaction::is_active`] only tracks this type's own commit and
/// rollback.
struct PostgresTransaction<'c> {
    client: &'c mut Client,
    active: bool,
}

impl Transaction for PostgresTransaction<'_> {
    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[&str]) -> Result<usize> {
        let rows = self
            .client
            .execute(number_placeholders(sql).as_str(), &bind(params))?;
        Ok(usize::try_from(rows).unwrap_or(usize::MAX))
    }

    fn exists(&mut self, sql: &str, params: &[&str]) -> Result<bool> {
        let rows = self
            .client
            .query(number_placeholders(sql).as_str(), &bind(params))?;
        Ok(!rows.is_empty())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn commit(&mut self) -> Result<()> {
        self.client.batch_execute("COMMIT")?;
        self.active = false;
        Ok(())
    }

    // A cancelled or failed statement leaves the transaction aborted, and
    // ROLLBACK ends it.
    fn rollback(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.client.batch_execute("ROLLBACK")?;
        self.active = false;
        Ok(())
    }
}

impl Drop for PostgresTransaction<'_> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.client.batch_execute("ROLLBACK") {
                log::debug!("Rollback on drop failed: {e}");
            }
        }
    }
}

fn bind<'a>(params: &'a [&'a str]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Rewrites `?` placeholders outside quoted text as `$1, $2, ...`.
fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut next = 1;

    for c in sql.chars() {
        match quote {
            None if c == '?' => {
                out.push('$');
                out.push_str(&next.to_string());
                next += 1;
                continue;
            }
            None if c == '\'' || c == '"' => quote = Some(c),
            Some(q) if c == q => quote = None,
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Connection factory for the `postgres` dialect.
///
/// # Errors
///
/// Returns [`Error::Connection`] tagged with the target name if the server
/// cannot be reached.
pub fn connect(target: &str, config: &TargetConfig) -> Result<Box<dyn Connection>> {
    let conn = PostgresConnection::open(&config.dsn).map_err(|e| Error::Connection {
        target: target.to_string(),
        source: Box::new(e),
    })?;
    Ok(Box::new(conn))
}
