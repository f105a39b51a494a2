//! Integration tests for error handling and exit codes.
//!
//! These tests verify that tidemark returns the documented exit codes:
//! - Exit code 0: Success
//! - Exit code 1: Migration failure (execution, ledger, structural)
//! - Exit code 2: Discovery error
//! - Exit code 3: Configuration error
//! - Exit code 4: Invalid arguments
//! - Exit code 130: Interrupted

mod common;

use common::TestEnv;
use predicates::prelude::*;

// ============================================================================
// Migration Failures (Exit Code 1)
// ============================================================================

#[test]
fn test_failing_sql_exits_1_and_rolls_back() {
    let env = TestEnv::with_targets(&["main"]);
    env.write_migration("main", "0001_users", "users");
    env.write_file(
        "migrations/main/0002_broken.up.sql",
        "CREATE TABLE half (id INTEGER);\nNOT VALID SQL;",
    );
    env.write_file("migrations/main/0002_broken.down.sql", "DROP TABLE half;");

    env.command()
        .arg("up")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("0002_broken.up.sql"))
        .stderr(predicate::str::contains("manual intervention").not());

    assert_eq!(env.ledger("main"), ["0001_users"]);
}

#[test]
fn test_missing_down_file_exits_1() {
    let env = TestEnv::with_targets(&["main"]);
    env.write_migration("main", "0001_users", "users");
    env.write_file(
        "migrations/main/0002_posts.up.sql",
        "CREATE TABLE posts (id INTEGER);",
    );
    env.command().arg("up").assert().success();

    env.command()
        .arg("down")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'0002_posts' has no .down.sql file"));

    assert_eq!(env.ledger("main"), ["0001_users", "0002_posts"]);
}

#[test]
fn test_ledger_write_failure_warns_about_sync() {
    let env = TestEnv::with_targets(&["main"]);
    env.write_file(
        "migrations/main/0001_seed.down.sql",
        "CREATE TABLE IF NOT EXISTS never (id INTEGER);",
    );

    env.command()
        .args([
            "apply",
            "--target",
            "main",
            "--file",
            "migrations/main/0001_seed.down.sql",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not recorded as applied"))
        .stderr(predicate::str::contains("manual intervention"));
}

// ============================================================================
// Discovery Errors (Exit Code 2)
// ============================================================================

#[test]
fn test_missing_migrations_directory_exits_2() {
    let env = TestEnv::with_targets(&["main"]);

    env.command()
        .arg("up")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("directory does not exist"));
}

#[test]
fn test_empty_migrations_directory_exits_2() {
    let env = TestEnv::with_targets(&["main"]);
    std::fs::create_dir_all(env.path().join("migrations/main")).unwrap();

    env.command()
        .arg("up")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no migration files found"));
}

// ============================================================================
// Configuration Errors (Exit Code 3)
// ============================================================================

#[test]
fn test_no_targets_configured_exits_3() {
    let env = TestEnv::new();

    env.command()
        .arg("up")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no database targets are configured"));
}

#[test]
fn test_unknown_target_exits_3() {
    let env = TestEnv::with_targets(&["main"]);

    env.command()
        .args(["up", "--target", "other"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("'other' is not configured"));
}

#[test]
fn test_unknown_dialect_exits_3() {
    let env = TestEnv::new();
    env.write_file(
        "tidemark.yaml",
        "databases:\n  main:\n    dialect: oracle\n    dsn: x\n",
    );
    env.write_migration("main", "0001_users", "users");

    env.command()
        .arg("up")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown dialect 'oracle'"));
}

#[test]
fn test_invalid_config_file_exits_3() {
    let env = TestEnv::new();
    env.write_file("tidemark.yaml", "databases:\n  main:\n    dialect: sqlite\n");

    env.command()
        .arg("up")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_missing_explicit_config_exits_3() {
    let env = TestEnv::new();

    env.command()
        .args(["--config", "nope.yaml", "up"])
        .assert()
        .code(3);
}

#[test]
fn test_config_env_var_is_honoured() {
    let env = TestEnv::new();
    env.write_file(
        "elsewhere.yaml",
        "databases:\n  main:\n    dialect: sqlite\n    dsn: main.db\n",
    );
    env.write_migration("main", "0001_users", "users");

    env.command()
        .env("TIDEMARK_CONFIG", "elsewhere.yaml")
        .arg("up")
        .assert()
        .success();
}

// ============================================================================
// Invalid Arguments (Exit Code 4 and clap usage errors)
// ============================================================================

#[test]
fn test_apply_non_migration_file_exits_4() {
    let env = TestEnv::with_targets(&["main"]);
    env.write_file("seed.sql", "SELECT 1;");

    env.command()
        .args(["apply", "--target", "main", "--file", "seed.sql"])
        .assert()
        .code(4);
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let env = TestEnv::new();

    env.command()
        .arg("sideways")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_quiet_suppresses_logs() {
    let env = TestEnv::with_targets(&["main"]);
    env.write_migration("main", "0001_users", "users");

    env.command()
        .args(["--quiet", "up"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_verbose_logs_each_migration() {
    let env = TestEnv::with_targets(&["main"]);
    env.write_migration("main", "0001_users", "users");

    env.command()
        .args(["--verbose", "up"])
        .assert()
        .success()
        .stderr(predicate::str::contains("INFO: Apply 0001_users"));
}

// ============================================================================
// Interruption (Exit Code 130)
// ============================================================================

#[cfg(unix)]
#[test]
fn test_sigint_rolls_back_running_migration() {
    let env = TestEnv::with_targets(&["main"]);
    env.write_migration("main", "0001_users", "users");
    env.write_file(
        "migrations/main/0002_slow.up.sql",
        "CREATE TABLE early (id INTEGER);\n\
         CREATE TABLE slow AS WITH RECURSIVE counter(x) AS \
         (SELECT 1 UNION ALL SELECT x + 1 FROM counter WHERE x < 500000000) \
         SELECT x FROM counter;",
    );
    env.write_file("migrations/main/0002_slow.down.sql", "DROP TABLE slow;");

    let child = env.spawn(&["up"]);
    std::thread::sleep(std::time::Duration::from_millis(500));
    let pid = libc::pid_t::try_from(child.id()).unwrap();
    assert_eq!(unsafe { libc::kill(pid, libc::SIGINT) }, 0);

    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(130), "stderr: {stderr}");
    assert!(stderr.contains("cancelled while applying"));
    assert!(stderr.contains("0002_slow.up.sql"));
    assert!(!stderr.contains("manual intervention"));

    assert_eq!(env.ledger("main"), ["0001_users"]);
}
