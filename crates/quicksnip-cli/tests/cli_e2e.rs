#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn snippet_file(&self) -> PathBuf {
        self.dir.path().join("snippets.yaml")
    }

    fn usage_file(&self) -> PathBuf {
        self.dir.path().join("usage.yaml")
    }

    fn qs(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("qs"));
        cmd.env("QUICKSNIP_SNIPPET_FILE", self.snippet_file())
            .env("QUICKSNIP_USAGE_FILE", self.usage_file())
            .env("NO_COLOR", "1")
            .env_remove("QUICKSNIP_LOG")
            .arg("--config")
            .arg(self.dir.path().join("config.toml"));
        cmd
    }
}

#[test]
fn test_first_run_lists_sample_library() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .assert()
        .success()
        .stdout(predicate::str::contains("flask-run"))
        .stdout(predicate::str::contains("git-uncommit"))
        .stderr(predicate::str::contains("Created a sample snippet library"));

    assert!(sandbox.snippet_file().exists());

    // Second run reads the file quietly.
    sandbox
        .qs()
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_copy_prompts_for_placeholders_and_counts_use() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .args(["copy", "flask-run", "--print"])
        .write_stdin("\n8080\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "python -m flask --app app run --debug --port 8080",
        ))
        .stderr(predicate::str::contains("port [5000]: "));

    let usage = fs::read_to_string(sandbox.usage_file()).unwrap();
    assert!(usage.contains("flask-run: 1"), "usage file was: {}", usage);

    sandbox
        .qs()
        .args(["show", "flask-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("used 1 time"))
        .stdout(predicate::str::contains("port (default: 5000)"));
}

#[test]
fn test_copy_by_fuzzy_query_with_presets() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .args(["copy", "flsk", "--print", "--set", "app_name=web", "--set", "port=9000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--app web run --debug --port 9000"));
}

#[test]
fn test_copy_cancelled_by_eof_delivers_nothing() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .args(["copy", "flask-run", "--print"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("nothing copied"));

    let usage = fs::read_to_string(sandbox.usage_file()).unwrap_or_default();
    assert!(!usage.contains("flask-run"));
}

#[test]
fn test_add_search_edit_remove() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .args([
            "add",
            "--name",
            "Docker cleanup",
            "--content",
            "docker system prune -f",
            "--tags",
            "Docker, ops",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added docker-cleanup"));

    let output = sandbox
        .qs()
        .args(["search", "dokcer", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(hits[0]["snippet"]["id"], "docker-cleanup");
    assert_eq!(hits[0]["snippet"]["tags"], serde_json::json!(["docker", "ops"]));

    sandbox
        .qs()
        .args(["edit", "docker-cleanup", "--description", "free disk space"])
        .assert()
        .success();

    sandbox
        .qs()
        .args(["show", "docker-cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("free disk space"));

    sandbox
        .qs()
        .args(["rm", "docker-cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed docker-cleanup"));

    sandbox
        .qs()
        .args(["show", "docker-cleanup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Not found: docker-cleanup"));
}

#[test]
fn test_add_reads_content_from_stdin() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .args(["add", "--name", "Greeting", "--id", "hi"])
        .write_stdin("Hello {{name:World}}!")
        .assert()
        .success();

    sandbox
        .qs()
        .args(["copy", "hi", "--print"])
        .write_stdin("Ada\n")
        .assert()
        .success()
        .stdout(predicate::eq("Hello Ada!"));
}

#[test]
fn test_add_without_name_content_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .args(["add", "--name", "   ", "--content", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid snippet entry"));
}

#[test]
fn test_backups_and_restore() {
    let sandbox = Sandbox::new();
    sandbox.qs().arg("list").assert().success();

    sandbox
        .qs()
        .args(["rm", "flask-run"])
        .assert()
        .success();

    sandbox
        .qs()
        .arg("backups")
        .assert()
        .success()
        .stdout(predicate::str::contains("snippets.yaml.backup.001"));

    sandbox
        .qs()
        .args(["restore", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored backup 1 (6 snippets)"));

    sandbox
        .qs()
        .args(["show", "flask-run"])
        .assert()
        .success();

    sandbox
        .qs()
        .args(["restore", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("backup 9"));
}

#[test]
fn test_corrupt_file_is_reported_and_recovered() {
    let sandbox = Sandbox::new();
    sandbox.qs().args(["rm", "git-uncommit"]).assert().success();

    fs::write(sandbox.snippet_file(), "snippets: [not : yaml").unwrap();

    sandbox
        .qs()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-uncommit"))
        .stderr(predicate::str::contains("recovered from backup 1"));
}

#[test]
fn test_tags_and_suggestions() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .arg("tags")
        .assert()
        .success()
        .stdout(predicate::str::contains("python"))
        .stdout(predicate::str::contains("git"));

    sandbox
        .qs()
        .args(["tags", "pyth", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"python\""));
}

#[test]
fn test_config_shows_environment_overrides() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .env("QUICKSNIP_MAX_RESULTS", "15")
        .env("QUICKSNIP_FUZZY_THRESHOLD", "95")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_results = 15"))
        .stdout(predicate::str::contains("warning: fuzzy_threshold"));
}

#[test]
fn test_config_file_is_read() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.dir.path().join("config.toml"), "backup_count = 7\n").unwrap();

    sandbox
        .qs()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("backup_count = 7"));
}

#[test]
fn test_watch_stops_when_stdin_closes() {
    let sandbox = Sandbox::new();

    sandbox
        .qs()
        .arg("watch")
        .write_stdin("")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stderr(predicate::str::contains("watching"))
        .stderr(predicate::str::contains("Ctrl-D to stop"));
}
