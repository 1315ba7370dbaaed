//! Smoke tests to verify command module wiring

use std::net::TcpListener;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fsnd() -> Command {
    let mut cmd = Command::cargo_bin("fsnd").unwrap();
    cmd.env_remove("DATABASE_URL").env_remove("RUST_LOG");
    cmd
}

// === Top-level ===

#[test]
fn test_help_lists_commands() {
    fsnd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("config"));
}

// === Serve Command Tests ===

#[test]
fn test_serve_help() {
    fsnd()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--in-memory"))
        .stdout(predicate::str::contains("fyyur"))
        .stdout(predicate::str::contains("trivia"));
}

#[test]
fn test_serve_rejects_unknown_app() {
    fsnd()
        .arg("serve")
        .arg("bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_serve_in_memory_ignores_database_url() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("logs").join("error.log");
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!("[log]\nfile = {:?}\n", log.to_string_lossy()),
    )
    .unwrap();

    // Hold the port so the server stops at bind instead of running forever
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    fsnd()
        .env("FSND_CONFIG", &config)
        .env("DATABASE_URL", "postgres://localhost/fsnd")
        .args(["serve", "trivia", "--in-memory", "--bind", &addr.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Server error"))
        .stderr(predicate::str::contains("cannot be used with").not());

    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("Starting trivia"));
}

// === Migrate Command Tests ===

#[test]
fn test_migrate_help() {
    fsnd()
        .arg("migrate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--database-url"));
}

// === Config Command Tests ===

#[test]
fn test_config_path_follows_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    fsnd()
        .env("FSND_CONFIG", &path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(path.to_string_lossy().as_ref()));
}

#[test]
fn test_config_show_reads_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[trivia]\nbind = \"0.0.0.0:8081\"\n\n[fyyur]\nbind = \"127.0.0.1:5000\"\n",
    )
    .unwrap();

    fsnd()
        .env("FSND_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:8081"));
}

#[test]
fn test_config_init_writes_file_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    fsnd()
        .env("FSND_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    fsnd()
        .env("FSND_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    fsnd()
        .env("FSND_CONFIG", &path)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}
