//! CLI integration tests for todo
//!
//! Each test runs the binary against its own temporary data directory and
//! checks what ends up on stdout, stderr and disk.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command bound to `dir` for data and config
fn todo_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("todo"));
    cmd.env_remove("TODO_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

/// Adds a task and returns its ID
fn add_task(dir: &Path, args: &[&str]) -> String {
    let output = todo_cmd(dir)
        .args(["--format", "json", "add"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());

    let task: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    task["id"].as_str().unwrap().to_string()
}

fn list_json(dir: &Path, args: &[&str]) -> Vec<serde_json::Value> {
    let output = todo_cmd(dir)
        .args(["--format", "json", "list"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn texts(tasks: &[serde_json::Value]) -> Vec<&str> {
    tasks.iter().map(|t| t["text"].as_str().unwrap()).collect()
}

// =============================================================================
// Adding and listing
// =============================================================================

#[test]
fn test_add_creates_snapshot() {
    let dir = TempDir::new().unwrap();

    todo_cmd(dir.path())
        .args(["add", "  Buy milk  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task: t-"))
        .stdout(predicate::str::contains("Buy milk"));

    let raw = fs::read_to_string(dir.path().join("data/todo-storage.json")).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot["schemaVersion"], 1);
    assert_eq!(snapshot["tasks"][0]["text"], "Buy milk");
    assert_eq!(snapshot["tasks"][0]["completed"], false);
    assert_eq!(snapshot["tasks"][0]["priority"], "medium");
}

#[test]
fn test_add_rejects_empty_text() {
    let dir = TempDir::new().unwrap();

    todo_cmd(dir.path())
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task cannot be empty"));

    assert!(!dir.path().join("data/todo-storage.json").exists());
}

#[test]
fn test_add_rejects_long_text() {
    let dir = TempDir::new().unwrap();
    let long = "a".repeat(501);

    todo_cmd(dir.path())
        .args(["add", long.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task is too long (max 500 characters)"));

    let max = "a".repeat(500);
    todo_cmd(dir.path()).args(["add", max.as_str()]).assert().success();
}

#[test]
fn test_list_is_newest_first() {
    let dir = TempDir::new().unwrap();
    add_task(dir.path(), &["First"]);
    add_task(dir.path(), &["Second"]);
    add_task(dir.path(), &["Third"]);

    let tasks = list_json(dir.path(), &[]);
    assert_eq!(texts(&tasks), vec!["Third", "Second", "First"]);
}

#[test]
fn test_list_text_shows_counts() {
    let dir = TempDir::new().unwrap();
    let done = add_task(dir.path(), &["Walk the dog"]);
    add_task(dir.path(), &["Water plants"]);
    todo_cmd(dir.path()).args(["toggle", done.as_str()]).assert().success();

    todo_cmd(dir.path())
        .args(["list", "--filter", "active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Water plants"))
        .stdout(predicate::str::contains("Walk the dog").not())
        .stdout(predicate::str::contains("Showing 1 task of 2 tasks"));
}

#[test]
fn test_list_empty() {
    let dir = TempDir::new().unwrap();

    todo_cmd(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"));
}

#[test]
fn test_list_search_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    add_task(dir.path(), &["Task one"]);
    add_task(dir.path(), &["task two"]);
    add_task(dir.path(), &["Something else"]);

    let upper = list_json(dir.path(), &["--search", "TASK"]);
    let lower = list_json(dir.path(), &["--search", "task"]);

    assert_eq!(texts(&upper), vec!["task two", "Task one"]);
    assert_eq!(upper, lower);
}

#[test]
fn test_list_sorts_by_priority_and_due_date() {
    let dir = TempDir::new().unwrap();
    add_task(dir.path(), &["Low", "--priority", "low", "--due", "2024-01-01"]);
    add_task(dir.path(), &["High undated", "--priority", "high"]);
    add_task(dir.path(), &["Medium", "--due", "2024-01-15"]);

    let by_priority = list_json(dir.path(), &["--sort", "priority"]);
    assert_eq!(texts(&by_priority), vec!["High undated", "Medium", "Low"]);

    let by_due = list_json(dir.path(), &["--sort", "due-date"]);
    assert_eq!(texts(&by_due), vec!["Low", "Medium", "High undated"]);
}

// =============================================================================
// Changing tasks
// =============================================================================

#[test]
fn test_toggle_twice_restores_state() {
    let dir = TempDir::new().unwrap();
    let id = add_task(dir.path(), &["Flip me"]);

    todo_cmd(dir.path())
        .args(["toggle", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed task"));

    todo_cmd(dir.path())
        .args(["toggle", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reopened task"));

    let tasks = list_json(dir.path(), &[]);
    assert_eq!(tasks[0]["completed"], false);
}

#[test]
fn test_edit_changes_text_priority_and_due() {
    let dir = TempDir::new().unwrap();
    let id = add_task(dir.path(), &["Draft", "--due", "2024-02-01"]);

    todo_cmd(dir.path())
        .args(["edit", id.as_str(), "  Final  ", "--priority", "high", "--clear-due"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated task"));

    let tasks = list_json(dir.path(), &[]);
    assert_eq!(tasks[0]["text"], "Final");
    assert_eq!(tasks[0]["priority"], "high");
    assert!(tasks[0].get("dueDate").is_none());
}

#[test]
fn test_priority_command() {
    let dir = TempDir::new().unwrap();
    let id = add_task(dir.path(), &["Important"]);

    todo_cmd(dir.path())
        .args(["priority", id.as_str(), "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("to high"));

    todo_cmd(dir.path())
        .args(["priority", id.as_str(), "urgent"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    add_task(dir.path(), &["Existing"]);

    for cmd in ["toggle", "delete"] {
        todo_cmd(dir.path())
            .args([cmd, "t-ffffffffff"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Task not found: t-ffffffffff"));
    }
}

#[test]
fn test_delete_removes_task() {
    let dir = TempDir::new().unwrap();
    let id = add_task(dir.path(), &["Remove me"]);
    add_task(dir.path(), &["Keep me"]);

    todo_cmd(dir.path())
        .args(["delete", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task"));

    assert_eq!(texts(&list_json(dir.path(), &[])), vec!["Keep me"]);
}

#[test]
fn test_clear_completed() {
    let dir = TempDir::new().unwrap();
    let c = add_task(dir.path(), &["C"]);
    add_task(dir.path(), &["B"]);
    let a = add_task(dir.path(), &["A"]);

    todo_cmd(dir.path())
        .arg("clear-completed")
        .assert()
        .success()
        .stdout(predicate::str::contains("No completed tasks"));

    todo_cmd(dir.path()).args(["toggle", a.as_str()]).assert().success();
    todo_cmd(dir.path()).args(["toggle", c.as_str()]).assert().success();

    todo_cmd(dir.path())
        .arg("clear-completed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 tasks"));

    assert_eq!(texts(&list_json(dir.path(), &[])), vec!["B"]);
}

#[test]
fn test_stats() {
    let dir = TempDir::new().unwrap();
    let a = add_task(dir.path(), &["A"]);
    add_task(dir.path(), &["B"]);
    add_task(dir.path(), &["C"]);
    todo_cmd(dir.path()).args(["toggle", a.as_str()]).assert().success();

    let output = todo_cmd(dir.path())
        .args(["--format", "json", "stats"])
        .output()
        .unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["active"], 2);
    assert_eq!(stats["completionRate"], 33);
}

// =============================================================================
// Preferences and configuration
// =============================================================================

#[test]
fn test_prefs_persist() {
    let dir = TempDir::new().unwrap();

    todo_cmd(dir.path())
        .args(["prefs", "theme", "dark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dark"));

    todo_cmd(dir.path())
        .args(["prefs", "reduce-animations", "on"])
        .assert()
        .success();

    let output = todo_cmd(dir.path())
        .args(["--format", "json", "prefs", "show"])
        .output()
        .unwrap();
    let prefs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(prefs, serde_json::json!({"theme": "dark", "reduceAnimations": true}));

    todo_cmd(dir.path())
        .args(["prefs", "theme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("light"));
}

#[test]
fn test_config_sets_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "default_priority = \"high\"\ndefault_format = \"json\"\n",
    )
    .unwrap();

    let output = todo_cmd(dir.path()).args(["add", "Configured"]).output().unwrap();
    let task: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(task["priority"], "high");
}

#[test]
fn test_bad_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "default_priority = \"urgent\"\n").unwrap();

    todo_cmd(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

// =============================================================================
// Recovery
// =============================================================================

#[test]
fn test_corrupt_snapshot_warns_and_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/todo-storage.json"), "{oops").unwrap();

    todo_cmd(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"))
        .stderr(predicate::str::contains("Warning: Saved tasks were discarded"));
}

#[test]
fn test_data_dir_from_env() {
    let dir = TempDir::new().unwrap();
    let env_dir = dir.path().join("from-env");

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("todo"))
        .env("TODO_DATA_DIR", &env_dir)
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["add", "Env task"])
        .assert()
        .success();

    assert!(env_dir.join("todo-storage.json").is_file());
}
