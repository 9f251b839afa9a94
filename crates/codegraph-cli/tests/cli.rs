//! CLI integration tests for the codegraph binary (grounded on
//! `codeprysm-cli`'s `tests/cli_parsing.rs` and `tests/integration.rs`: a
//! `cargo_bin` helper plus `assert_cmd`/`predicates` assertions against real
//! process output).

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn codegraph() -> Command {
    Command::cargo_bin("codegraph").expect("failed to find codegraph binary")
}

fn write_project(dir: &TempDir) {
    fs::write(
        dir.path().join("a.ts"),
        "import { helper } from './b';\n",
    )
    .unwrap();
    fs::write(dir.path().join("b.ts"), "export function helper() {}\n").unwrap();
}

#[test]
fn help_lists_every_subcommand() {
    codegraph()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("deps"))
        .stdout(predicate::str::contains("dependents"))
        .stdout(predicate::str::contains("cycles"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn deps_requires_a_file_argument() {
    codegraph()
        .args(["deps"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn analyze_then_stats_reports_the_walked_project() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);

    codegraph()
        .current_dir(dir.path())
        .args(["analyze", "."])
        .assert()
        .success();

    let output = codegraph()
        .current_dir(dir.path())
        .arg("stats")
        .output()
        .expect("failed to run codegraph stats");
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(stats["total_nodes"].as_i64().unwrap() >= 2);
    assert!(stats["total_relationships"].as_i64().unwrap() >= 1);
}

#[test]
fn deps_and_dependents_agree_after_analyze() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);

    codegraph()
        .current_dir(dir.path())
        .args(["analyze", "."])
        .assert()
        .success();

    let deps_output = codegraph()
        .current_dir(dir.path())
        .args(["deps", "a.ts"])
        .output()
        .expect("failed to run codegraph deps");
    let deps: serde_json::Value = serde_json::from_slice(&deps_output.stdout).unwrap();
    assert_eq!(deps.as_array().unwrap().len(), 1);
    assert_eq!(deps[0]["source_file"], "b.ts");

    let dependents_output = codegraph()
        .current_dir(dir.path())
        .args(["dependents", "b.ts"])
        .output()
        .expect("failed to run codegraph dependents");
    let dependents: serde_json::Value = serde_json::from_slice(&dependents_output.stdout).unwrap();
    assert_eq!(dependents.as_array().unwrap().len(), 1);
    assert_eq!(dependents[0]["source_file"], "a.ts");
}

#[test]
fn cycles_on_an_acyclic_project_is_empty() {
    let dir = TempDir::new().unwrap();
    write_project(&dir);

    codegraph()
        .current_dir(dir.path())
        .args(["analyze", "."])
        .assert()
        .success();

    let output = codegraph()
        .current_dir(dir.path())
        .arg("cycles")
        .output()
        .expect("failed to run codegraph cycles");
    let cycles: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cycles.as_array().unwrap().len(), 0);
}
