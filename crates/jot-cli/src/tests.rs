//! CLI command tests
//!
//! These tests drive the command implementations against temp ledger and
//! preference files.

use std::fs;
use std::path::PathBuf;

use crate::commands;

/// Write a small ledger file and return its path
fn setup_ledger(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("ledger.json");
    fs::write(
        &path,
        r#"{
            "accounts": [
                {"id": 1, "name": "Cash"},
                {"id": 2, "name": "Bank Account"}
            ],
            "categories": [
                {"name": "Food & Dining", "kind": "expense"},
                {"name": "Salary", "kind": "income"},
                {"name": "Transfer", "kind": "transfer"}
            ]
        }"#,
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_cmd_parse_writes_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = setup_ledger(&dir);
    let prefs = dir.path().join("prefs.json");

    let result = commands::cmd_parse(
        &ledger,
        Some(prefs.as_path()),
        "lunch 180 cash",
        Some("2024-03-15"),
        true,
        false,
        true,
    )
    .await;
    assert!(result.is_ok());
    assert!(prefs.exists(), "confirmed parse must be learned");
}

#[tokio::test]
async fn test_cmd_parse_no_learn_skips_write() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = setup_ledger(&dir);
    let prefs = dir.path().join("prefs.json");

    let result = commands::cmd_parse(
        &ledger,
        Some(prefs.as_path()),
        "lunch 180 cash",
        Some("2024-03-15"),
        true,
        true,
        false,
    )
    .await;
    assert!(result.is_ok());
    assert!(!prefs.exists());
}

#[tokio::test]
async fn test_cmd_parse_missing_ledger_errors() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = dir.path().join("prefs.json");

    let result = commands::cmd_parse(
        &dir.path().join("absent.json"),
        Some(prefs.as_path()),
        "lunch 180 cash",
        None,
        true,
        true,
        false,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cmd_parse_rejects_bad_today() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = setup_ledger(&dir);

    let result = commands::cmd_parse(
        &ledger,
        Some(dir.path().join("prefs.json").as_path()),
        "lunch 180 cash",
        Some("15/03/2024"),
        true,
        true,
        false,
    )
    .await;
    assert!(result.is_err());
}

#[test]
fn test_cmd_prefs_list_on_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::cmd_prefs_list(Some(dir.path().join("prefs.json").as_path()));
    assert!(result.is_ok());
}
