//! CLI integration tests for the TraceChain command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Configuration layering is visible through `config show`
//! - Commands needing a session fail cleanly without one
//!
//! Note: These tests do not require a running replica or identity
//! provider. Each test points config and data directories at a tempdir.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the tracechain binary, isolated from the user's setup.
fn tracechain(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tracechain").unwrap();
    cmd.current_dir(dir.path())
        .env("TRACECHAIN_CONFIG_DIR", dir.path().join("config"))
        .env("TRACECHAIN_DATA_DIR", dir.path().join("data"))
        .env_remove("TRACECHAIN_NETWORK")
        .env_remove("TRACECHAIN_HOST")
        .env_remove("TRACECHAIN_CANISTER_ID")
        .env_remove("TRACECHAIN_II_CANISTER_ID")
        .env_remove("TRACECHAIN_IDENTITY_PROVIDER");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("supply-chain traceability"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tracechain"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("ping"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("analytics"))
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("product"))
        .stdout(predicate::str::contains("events"))
        .stdout(predicate::str::contains("partner"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("debug"));
}

#[test]
fn test_auth_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("whoami"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Parsing Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_command_fails() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir).arg("teleport").assert().failure();
}

#[test]
fn test_invalid_network_rejected() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["--network", "moon", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("moon"));
}

#[test]
fn test_invalid_role_rejected() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args([
            "user",
            "register",
            "--email",
            "a@b.c",
            "--first-name",
            "A",
            "--last-name",
            "B",
            "--company",
            "C",
            "--role",
            "wizard",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wizard"));
}

#[test]
fn test_verify_requires_valid_principal() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["user", "verify", "not-a-principal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid principal"));
}

#[test]
fn test_product_get_requires_id() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["product", "get"])
        .assert()
        .failure();
}

#[test]
fn test_event_metadata_must_be_key_value() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args([
            "events", "add", "CT-1", "--stage", "shipping", "--location", "Rotterdam", "--meta",
            "oops",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key=value"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults_to_local() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"network\": \"local\""))
        .stdout(predicate::str::contains("localhost:4943"));
}

#[test]
fn test_config_show_network_flag() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["--json", "--network", "ic", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"network\": \"ic\""))
        .stdout(predicate::str::contains("https://identity.ic0.app"))
        .stdout(predicate::str::contains("\"fetch_root_key\": false"));
}

#[test]
fn test_config_show_project_file_and_env() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("tracechain.toml"),
        "[canisters]\nsupply_chain = \"ryjl3-tyaaa-aaaaa-aaaba-cai\"\n",
    )
    .unwrap();

    tracechain(&dir)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ryjl3-tyaaa-aaaaa-aaaba-cai"));

    tracechain(&dir)
        .env("TRACECHAIN_CANISTER_ID", "r7inp-6aaaa-aaaaa-aaabq-cai")
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("r7inp-6aaaa-aaaaa-aaabq-cai"));
}

#[test]
fn test_config_path_lists_sources() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tracechain.toml"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[network]\nname = \"ic\"\n").unwrap();

    tracechain(&dir)
        .arg("--json")
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"network\": \"ic\""));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["--config", "does-not-exist.toml", "config", "show"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_auth_status_without_session() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"authenticated\": false"))
        .stdout(predicate::str::contains("\"state\": \"unauthenticated\""));
}

#[test]
fn test_whoami_without_session_fails() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["auth", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authenticated"));
}

#[test]
fn test_remote_call_without_session_fails() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["product", "get", "CT-2024-001234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authenticated"));
}

#[test]
fn test_logout_without_session_succeeds() {
    let dir = TempDir::new().unwrap();
    tracechain(&dir)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
}

#[test]
fn test_login_prints_url_to_stderr_in_json_mode() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("tracechain.toml"),
        "[identity]\nlogin_timeout_secs = 1\n",
    )
    .unwrap();

    tracechain(&dir)
        .args(["--json", "auth", "login", "--no-browser"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Open this URL"))
        .stderr(predicate::str::contains("http://127.0.0.1:"))
        .stderr(predicate::str::contains("Login failed"));
}
