//! CLI integration tests
//!
//! Tests the greetlink CLI using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn greetlink() -> Command {
    let mut cmd = Command::cargo_bin("greetlink")
        .expect("Failed to locate greetlink binary - ensure it's built before running tests");
    cmd.env_remove("GREETLINK_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    greetlink()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("greetlink"))
        .stdout(predicate::str::contains("session brokers"));
}

#[test]
fn test_cli_version() {
    greetlink()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("greetlink"));
}

#[test]
fn test_cli_login_help() {
    greetlink()
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--username"))
        .stdout(predicate::str::contains("--show-log"));
}

#[test]
fn test_cli_requires_subcommand() {
    greetlink().assert().failure();
}

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    greetlink()
        .args(["config", "path", "-c"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_show_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    greetlink()
        .args(["config", "init", "-c"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    greetlink()
        .args(["config", "show", "-c"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[client]"))
        .stdout(predicate::str::contains("%SESSION_COMMAND%"));

    greetlink()
        .args(["config", "get", "client.url", "-c"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ws://127.0.0.1:12801/ws"));
}

#[test]
fn test_config_get_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[client]\nurl = \"ws://10.0.0.9/ws\"\n").unwrap();

    greetlink()
        .args(["config", "get", "client.nope", "-c"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Key not found"));
}

#[test]
fn test_login_against_closed_port_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, format!("[client]\nurl = \"ws://{}/ws\"\n", addr)).unwrap();

    greetlink()
        .args(["login", "--username", "alice", "-c"])
        .arg(&path)
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Connection closed"));
}
