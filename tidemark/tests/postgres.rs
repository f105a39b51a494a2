//! Integration tests against a live PostgreSQL server.
//!
//! Built with `--features postgres`. Each test returns early unless
//! `TIDEMARK_TEST_POSTGRES_DSN` names a database the tests may write to.

#![cfg(feature = "postgres")]

use std::fs;

use tidemark::database::{Connection, DialectRegistry, PostgresConnection};
use tidemark::operations::{MigrationRunner, TargetStatus};
use tidemark::{Config, Direction, Error, TargetConfig};

const DSN_ENV: &str = "TIDEMARK_TEST_POSTGRES_DSN";

struct Server {
    dsn: String,
    suffix: String,
    root: tempfile::TempDir,
}

impl Server {
    fn from_env() -> Option<Self> {
        let dsn = std::env::var(DSN_ENV).ok()?;
        Some(Self {
            dsn,
            suffix: format!("{}_{}", std::process::id(), clock_suffix()),
            root: tempfile::tempdir().unwrap(),
        })
    }

    fn ledger_table(&self) -> String {
        format!("tidemark_ledger_{}", self.suffix)
    }

    fn config(&self) -> Config {
        let mut target = TargetConfig::new("postgres", self.dsn.clone());
        target.table_name = Some(self.ledger_table());
        let mut config = Config {
            migrations_dir: Some(self.root.path().to_path_buf()),
            ..Default::default()
        };
        config.databases.insert("main".into(), target);
        config
    }

    fn write(&self, file: &str, sql: &str) {
        let dir = self.root.path().join("main");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), sql).unwrap();
    }

    fn rows(&self, sql: &str) -> Vec<Vec<String>> {
        PostgresConnection::open(&self.dsn)
            .unwrap()
            .query_rows(sql)
            .unwrap()
    }

    fn table_exists(&self, table: &str) -> bool {
        !self
            .rows(&format!("SELECT 1 FROM pg_tables WHERE tablename = '{table}'"))
            .is_empty()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Ok(mut conn) = PostgresConnection::open(&self.dsn) {
            let _ = conn.execute_batch(&format!(
                "DROP TABLE IF EXISTS {}; DROP TABLE IF EXISTS users_{};",
                self.ledger_table(),
                self.suffix
            ));
        }
    }
}

fn clock_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        % 1_000_000
}

#[test]
fn test_up_and_down_round_trip() {
    let Some(server) = Server::from_env() else {
        eprintln!("{DSN_ENV} not set, skipping");
        return;
    };
    let users = format!("users_{}", server.suffix);
    server.write(
        "0001_users.up.sql",
        &format!("CREATE TABLE {users} (id SERIAL PRIMARY KEY, email TEXT NOT NULL);"),
    );
    server.write("0001_users.down.sql", &format!("DROP TABLE {users};"));

    let config = server.config();
    let registry = DialectRegistry::default();
    let runner = MigrationRunner::new(&config, &registry);

    let report = runner.run(Some("main"), Direction::Up).unwrap();
    assert!(report.is_success());
    assert!(server.table_exists(&users));
    assert_eq!(
        server.rows(&format!("SELECT identifier FROM {}", server.ledger_table())),
        [["0001_users"]]
    );

    let report = runner.run(Some("main"), Direction::Up).unwrap();
    assert!(matches!(
        report.outcomes[0].result,
        Ok(TargetStatus::NothingToDo)
    ));

    runner
        .run(Some("main"), Direction::Down)
        .unwrap()
        .into_result()
        .unwrap();
    assert!(!server.table_exists(&users));
}

#[test]
fn test_failing_change_set_rolls_back_ddl() {
    let Some(server) = Server::from_env() else {
        eprintln!("{DSN_ENV} not set, skipping");
        return;
    };
    let users = format!("users_{}", server.suffix);
    server.write(
        "0001_users.up.sql",
        &format!("CREATE TABLE {users} (id INTEGER);\nNOT VALID SQL;"),
    );
    server.write("0001_users.down.sql", &format!("DROP TABLE {users};"));

    let config = server.config();
    let registry = DialectRegistry::default();
    let report = MigrationRunner::new(&config, &registry)
        .run(Some("main"), Direction::Up)
        .unwrap();

    let err = report.outcomes[0].result.as_ref().unwrap_err();
    assert!(matches!(err, Error::Execution { rollback: None, .. }));
    assert!(!server.table_exists(&users));
    assert!(server
        .rows(&format!("SELECT identifier FROM {}", server.ledger_table()))
        .is_empty());
}
