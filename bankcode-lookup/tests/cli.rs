//! CLI integration tests for bankcode-lookup
//!
//! Everything runs against the built-in sample catalog (`--demo`), so no
//! network or desktop clipboard is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command with an isolated config location
fn lookup(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bankcode-lookup").unwrap();
    cmd.env("BANKCODE_CONFIG", temp_dir.path().join("config.toml"))
        .env_remove("BANKCODE_API_URL")
        .env_remove("BANKCODE_LOG_FORMAT")
        .env_remove("BANKCODE_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_flag_output() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Look up Taiwanese bank branches"))
        .stdout(predicate::str::contains("--bank"))
        .stdout(predicate::str::contains("--link"))
        .stdout(predicate::str::contains("--copy"))
        .stdout(predicate::str::contains("EXIT CODES"));
}

#[test]
fn test_lists_banks() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .arg("--demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Banks:"))
        .stdout(predicate::str::contains("004  Bank 004 - Taipei"))
        .stdout(predicate::str::contains("007  Bank 007 - Kaohsiung"));
}

#[test]
fn test_lists_branches_of_bank() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--bank", "004"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Branches of 004:"))
        .stdout(predicate::str::contains("0040001  Taipei HQ"));
}

#[test]
fn test_bank_without_branches() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--bank", "007"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no branches)"));
}

#[test]
fn test_branch_detail_and_link() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--bank", "004", "--branch", "0040001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Phone:   02-1234"))
        .stdout(predicate::str::contains("Address: No.1 Rd"))
        .stdout(predicate::str::contains(
            "Link:    http://localhost:3000/banks/004/0040001",
        ));
}

#[test]
fn test_deep_link_with_origin_override() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args([
            "--demo",
            "--origin",
            "https://lookup.example.tw",
            "--link",
            "https://elsewhere.example.tw/banks/004/0040001",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://lookup.example.tw/banks/004/0040001",
        ));
}

#[test]
fn test_link_to_missing_branch_exits_2() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--link", "/banks/004/0049999"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Branches of 004:"))
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_json_output() {
    let temp_dir = TempDir::new().unwrap();

    let output = lookup(&temp_dir)
        .args(["--demo", "--bank", "004", "--branch", "0040001", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["phase"], "branch_detail_ready");
    assert_eq!(value["bank_codes"], serde_json::json!(["004", "007"]));
    assert_eq!(value["link"], "http://localhost:3000/banks/004/0040001");
}

#[test]
fn test_copy_branch_code() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--bank", "004", "--branch", "0040001", "--copy", "code"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Copied 0040001"));
}

#[test]
fn test_copy_without_selection_fails() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--copy", "url"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No branch is selected"));
}

#[test]
fn test_empty_bank_code_is_invalid_input() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--bank", ""])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Bank code cannot be empty"));
}

#[test]
fn test_unrecognised_link_is_invalid_input() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--link", "/banks/004/0040001/extra"])
        .assert()
        .code(3);
}

#[test]
fn test_config_file_origin() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        r#"
[catalog]
base_url = "http://localhost:8080"

[share]
origin = "https://banks.example.tw/"
"#,
    )
    .unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--bank", "004", "--branch", "0040001"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://banks.example.tw/banks/004/0040001",
        ));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.toml"), "not = [valid").unwrap();

    lookup(&temp_dir)
        .arg("--demo")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_interactive_deep_link() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--interactive"])
        .write_stdin("open /banks/004/0040001\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("-> /banks/004/0040001"))
        .stdout(predicate::str::contains("Phone:   02-1234"));
}

#[test]
fn test_interactive_unknown_command() {
    let temp_dir = TempDir::new().unwrap();

    lookup(&temp_dir)
        .args(["--demo", "--interactive"])
        .write_stdin("dance\nquit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command 'dance'"));
}
