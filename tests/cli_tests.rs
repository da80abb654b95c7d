//! Integration tests for the CLI interface

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CONTACT: &str = r#"{
    "contactid": "c-7",
    "fullname": "Ada Lovelace",
    "emailaddress1": "  ",
    "address1": {"city": "London"}
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("courier").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("transform"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_transform_full_mapping_from_yaml() {
    let dir = TempDir::new().unwrap();
    let mapping = write(
        &dir,
        "contact.yaml",
        "id: contactid\nname: fullname\ncity: address1.city\nzip: address1.zip\n",
    );
    let input = write(&dir, "contact.json", CONTACT);

    let mut cmd = Command::cargo_bin("courier").unwrap();
    let assert = cmd
        .arg("transform")
        .arg("--mapping")
        .arg(&mapping)
        .arg("--input")
        .arg(&input)
        .assert()
        .success();

    assert_eq!(
        stdout_json(&assert.get_output().stdout),
        json!({"id": "c-7", "name": "Ada Lovelace", "city": "London", "zip": null})
    );
}

#[test]
fn test_transform_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let mapping = write(&dir, "mapping.json", r#"{"$pipe": ["address1", "city"]}"#);

    let mut cmd = Command::cargo_bin("courier").unwrap();
    cmd.arg("transform")
        .arg("-m")
        .arg(&mapping)
        .write_stdin(CONTACT)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"London\""));
}

#[test]
fn test_transform_exclusive_drops_missing_and_omitted() {
    let dir = TempDir::new().unwrap();
    let fields = write(
        &dir,
        "fields.json",
        r#"{
            "id": {"from": "contactid"},
            "email": {"from": "emailaddress1", "function": {"$fn": "or_drop", "inner": {"$fn": "trim"}}},
            "phone": {"from": "telephone1"}
        }"#,
    );
    let input = write(&dir, "contact.json", CONTACT);

    let mut cmd = Command::cargo_bin("courier").unwrap();
    let assert = cmd
        .args(["transform", "--mode", "exclusive", "--mapping"])
        .arg(&fields)
        .arg("--input")
        .arg(&input)
        .assert()
        .success();

    assert_eq!(stdout_json(&assert.get_output().stdout), json!({"id": "c-7"}));
}

#[test]
fn test_transform_subset_fails_on_missing_path() {
    let dir = TempDir::new().unwrap();
    let fields = write(&dir, "fields.json", r#"{"phone": {"from": "telephone1"}}"#);
    let input = write(&dir, "contact.json", CONTACT);

    let mut cmd = Command::cargo_bin("courier").unwrap();
    cmd.args(["transform", "--mode", "subset", "--mapping"])
        .arg(&fields)
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("telephone1"));
}

#[test]
fn test_validate_reports_mapping_kind() {
    let dir = TempDir::new().unwrap();
    let mapping = write(&dir, "mapping.yaml", "- contactid\n- fullname\n");

    let mut cmd = Command::cargo_bin("courier").unwrap();
    cmd.args(["validate", "--mapping"])
        .arg(&mapping)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid mapping: list"));
}

#[test]
fn test_validate_rejects_unknown_function() {
    let dir = TempDir::new().unwrap();
    let mapping = write(&dir, "mapping.json", r#"{"name": {"$fn": "shout"}}"#);

    let mut cmd = Command::cargo_bin("courier").unwrap();
    cmd.args(["validate", "--mapping"])
        .arg(&mapping)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown function 'shout'"));
}

#[test]
fn test_transform_rejects_invalid_input() {
    let dir = TempDir::new().unwrap();
    let mapping = write(&dir, "mapping.json", r#""fullname""#);

    let mut cmd = Command::cargo_bin("courier").unwrap();
    cmd.args(["transform", "--mapping"])
        .arg(&mapping)
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input is not valid JSON"));
}
