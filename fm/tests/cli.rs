//! Command-line tests for the `fm` binary

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

const SCENARIO: &str = r#"
roster:
  - id: P1
    strength: 0.1
  - id: P2
    strength: 0.9
  - id: P3
    strength: 0.2
proposals:
  - proposer: P1
    action: read_file
  - proposer: P2
    action: edit_file
  - proposer: P3
    action: read_file
"#;

#[test]
fn test_cli_help() {
    let mut cmd = cargo_bin_cmd!("fm");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("semantics"));
}

#[test]
fn test_cli_semantics_lists_identifiers() {
    let home = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("fm");
    cmd.env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .arg("semantics")
        .assert()
        .success()
        .stdout(predicate::str::contains("QuadraticEnergy_model"))
        .stdout(predicate::str::contains("DFQuAD_model"))
        .stdout(predicate::str::contains("MLPBased_model"));
}

#[test]
fn test_cli_resolve_json() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("round.yml");
    fs::write(&file, SCENARIO).unwrap();

    let mut cmd = cargo_bin_cmd!("fm");
    let output = cmd
        .env("HOME", temp.path())
        .env("XDG_DATA_HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path())
        .current_dir(temp.path())
        .args(["resolve", "--seed", "7", "--permutations", "20", "--format", "json"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["seed"], 7);
    assert_eq!(report["permutations"], 20);
    assert_eq!(report["semantics"], "QuadraticEnergy_model");
    assert_eq!(report["proposers"].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_resolve_is_reproducible() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("round.yml");
    fs::write(&file, SCENARIO).unwrap();

    let run = || {
        cargo_bin_cmd!("fm")
            .env("HOME", temp.path())
            .env("XDG_DATA_HOME", temp.path())
            .env("XDG_CONFIG_HOME", temp.path())
            .current_dir(temp.path())
            .args(["resolve", "--seed", "7", "--permutations", "20", "--format", "json"])
            .arg(&file)
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_cli_resolve_writes_graph() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("round.yml");
    fs::write(&file, SCENARIO).unwrap();
    let graph = temp.path().join("qbaf.dot");

    cargo_bin_cmd!("fm")
        .env("HOME", temp.path())
        .env("XDG_DATA_HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path())
        .current_dir(temp.path())
        .args(["resolve", "--seed", "7", "--graph"])
        .arg(&graph)
        .arg(&file)
        .assert()
        .success();

    let dot = fs::read_to_string(&graph).unwrap();
    assert!(dot.starts_with("digraph qbaf {"));
    assert!(dot.contains("action:read_file"));
}

#[test]
fn test_cli_resolve_unknown_semantics_fails() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("round.yml");
    fs::write(&file, SCENARIO).unwrap();

    let mut cmd = cargo_bin_cmd!("fm");
    cmd.env("HOME", temp.path())
        .env("XDG_DATA_HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path())
        .current_dir(temp.path())
        .args(["resolve", "--semantics", "Bogus_model"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid resolver settings"));
}

#[test]
fn test_cli_resolve_missing_file_fails() {
    let temp = tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("fm");
    cmd.env("HOME", temp.path())
        .env("XDG_DATA_HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path())
        .current_dir(temp.path())
        .args(["resolve", "does-not-exist.yml"])
        .assert()
        .failure();
}
