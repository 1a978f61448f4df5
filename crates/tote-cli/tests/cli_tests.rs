//! Binary smoke tests for `tote`.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn tote(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tote"));
    cmd.current_dir(dir).env("NO_COLOR", "1").env("CI", "1");
    cmd
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// `.output/server/index.mjs` importing a single installed package.
fn server_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, ".output/server/index.mjs", "import dep from 'dep';\nexport default dep;\n");
    write(
        root,
        "node_modules/dep/package.json",
        r#"{ "name": "dep", "version": "1.2.3", "main": "index.js" }"#,
    );
    write(root, "node_modules/dep/index.js", "module.exports = 'dep';\n");
    temp
}

#[test]
fn help_lists_commands() {
    let temp = TempDir::new().unwrap();
    tote(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("trace").and(predicate::str::contains("check")));
}

#[test]
fn schema_prints_config_fields() {
    let temp = TempDir::new().unwrap();
    tote(temp.path())
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("outDir").and(predicate::str::contains("batchSize")));
}

#[test]
fn trace_materializes_and_writes_report() {
    let temp = server_project();

    tote(temp.path())
        .args(["trace", ".output/server/index.mjs", "--report", "report.json"])
        .assert()
        .success();

    let out = temp.path().join(".output/server/node_modules/dep");
    assert!(out.join("index.js").is_file());
    assert!(out.join("package.json").is_file());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["packages"], 1);
    assert_eq!(report["files_copied"], 1);
    assert_eq!(report["pnp_detected"], false);
}

#[test]
fn trace_reads_entries_from_config_file() {
    let temp = server_project();
    write(
        temp.path(),
        "tote.config.json",
        r#"{ "entries": [".output/server/index.mjs"], "outDir": ".output/server" }"#,
    );

    tote(temp.path()).arg("trace").assert().success();

    assert!(
        temp.path()
            .join(".output/server/node_modules/dep/index.js")
            .is_file()
    );
}

#[test]
fn trace_missing_entry_fails() {
    let temp = server_project();

    tote(temp.path())
        .args(["trace", "dist/missing.mjs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry point not found"));
}

#[test]
fn trace_creates_missing_output_dir() {
    let temp = server_project();

    tote(temp.path())
        .args(["trace", ".output/server/index.mjs", "--out-dir", "build/server"])
        .assert()
        .success();

    assert!(
        temp.path()
            .join("build/server/node_modules/dep/index.js")
            .is_file()
    );
}

#[test]
fn trace_rejects_empty_output_dir() {
    let temp = server_project();
    write(
        temp.path(),
        "tote.config.json",
        r#"{ "entries": [".output/server/index.mjs"], "outDir": "" }"#,
    );

    tote(temp.path())
        .arg("trace")
        .assert()
        .failure()
        .stderr(predicate::str::contains("outDir"));
}

#[test]
fn trace_with_forced_color() {
    let temp = server_project();

    let mut cmd = tote(temp.path());
    cmd.env_remove("NO_COLOR").env("FORCE_COLOR", "1");
    cmd.args(["trace", ".output/server/index.mjs"])
        .assert()
        .success();

    assert!(
        temp.path()
            .join(".output/server/node_modules/dep/index.js")
            .is_file()
    );
}

#[test]
fn trace_entries_are_relative_to_working_directory() {
    let temp = server_project();
    let server = temp.path().join(".output/server");

    tote(&server)
        .args(["trace", "index.mjs", "--base-dir", "../..", "--out-dir", "."])
        .assert()
        .success();

    assert!(server.join("node_modules/dep/index.js").is_file());
}

#[test]
fn check_reports_plug_n_play() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.js", "module.exports = 1;\n");
    write(temp.path(), ".pnp.cjs", "");

    tote(temp.path())
        .args(["check", "index.js", "--out-dir", "."])
        .assert()
        .success()
        .stderr(predicate::str::contains("Plug'n'Play"));
}

#[test]
fn check_rejects_unknown_config_fields() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.js", "");
    write(temp.path(), "tote.config.json", r#"{ "entrys": ["index.js"] }"#);

    tote(temp.path())
        .args(["check", "index.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
