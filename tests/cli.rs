use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn bin(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_track"));
    cmd.env("TRACK_CLI_HOME", home).env("NO_COLOR", "1");
    cmd
}

fn track(home: &Path, args: &[&str]) -> Output {
    bin(home).args(args).output().expect("run track")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

fn read_tasks(home: &Path, project: &str) -> Vec<Value> {
    let path = home.join(project).join("tasks.json");
    let text = fs::read_to_string(path).expect("read tasks");
    serde_json::from_str(&text).expect("parse tasks")
}

#[test]
fn first_run_bootstraps_config() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path().join(".track-cli");

    let output = track(&home, &["plot"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Not yet implemented"));

    let config: Value =
        serde_json::from_str(&fs::read_to_string(home.join("track-cli-config.json")).expect("config"))
            .expect("json");
    assert_eq!(
        config.get("track_cli_dir").and_then(|v| v.as_str()),
        Some(home.to_str().expect("utf8 path"))
    );
}

#[test]
fn init_add_eval_list_export_scenario() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();

    let output = track(home, &["init", "demo"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Project 'demo' initialized."));

    let output = track(home, &["add", "write spec"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Task added to project 'demo'"));

    let tasks = read_tasks(home, "demo");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].get("task_id").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(tasks[0].get("description").and_then(|v| v.as_str()), Some("write spec"));
    let time_add = tasks[0].get("time_add").and_then(|v| v.as_str()).expect("time_add");
    assert_eq!(time_add.len(), 17);

    let output = track(home, &["eval", "--task_id", "1", "--score", "5"]);
    assert!(output.status.success());
    let tasks = read_tasks(home, "demo");
    assert_eq!(tasks[0].get("score_eval").and_then(|v| v.as_str()), Some("5"));

    let output = track(home, &["list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("| 1  |    *     | write spec  |"));

    let dest = temp.path().join("out.csv");
    let output = track(home, &["export", dest.to_str().expect("utf8"), "--format", "csv"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Data exported to"));

    let csv = fs::read_to_string(&dest).expect("csv");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "description,task_id,time_add,score_eval");
    assert!(lines[1].starts_with("write spec,1,"));
    assert!(lines[1].ends_with(",5"));
}

#[test]
fn add_records_extra_fields_in_any_flag_order() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);
    track(home, &["init", "side"]);

    let output = track(home, &["add", "spike", "--estimate", "2h", "--project", "demo"]);
    assert!(output.status.success());

    let tasks = read_tasks(home, "demo");
    assert_eq!(tasks[0].get("estimate").and_then(|v| v.as_str()), Some("2h"));
    assert!(tasks[0].get("project").is_none());
    assert!(!home.join("side").join("tasks.json").exists());
}

#[test]
fn eval_defaults_to_latest_task() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);
    track(home, &["add", "first"]);
    track(home, &["add", "second"]);

    let output = track(home, &["eval", "--done", "yes"]);
    assert!(output.status.success());

    let tasks = read_tasks(home, "demo");
    assert!(tasks[0].get("done_eval").is_none());
    assert_eq!(tasks[1].get("done_eval").and_then(|v| v.as_str()), Some("yes"));
}

#[test]
fn eval_unknown_task_leaves_file_unchanged() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);
    track(home, &["add", "first"]);

    let path = home.join("demo").join("tasks.json");
    let before = fs::read(&path).expect("read");

    let output = track(home, &["eval", "--task_id", "7", "--score", "5"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Task with ID 7 not found in project 'demo'."));
    assert_eq!(fs::read(&path).expect("read"), before);
}

#[test]
fn eval_empty_value_does_not_resolve() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);
    track(home, &["add", "first"]);
    track(home, &["eval", "--note", ""]);

    let output = track(home, &["list"]);
    assert!(stdout(&output).contains("| 1  |          | first       |"));
}

#[test]
fn list_without_tasks_reports_and_writes_nothing() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);

    let output = track(home, &["list"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No tasks found for project 'demo'."));
    assert!(!home.join("demo").join("tasks.json").exists());
}

#[test]
fn switch_redirects_add() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);

    let output = track(home, &["switch", "other"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Switched to project 'other'."));

    track(home, &["add", "elsewhere"]);
    assert_eq!(read_tasks(home, "other").len(), 1);
    assert!(!home.join("demo").join("tasks.json").exists());
}

#[test]
fn export_json_matches_stored_tasks() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);
    track(home, &["add", "first", "--size", "S"]);
    track(home, &["add", "second"]);
    track(home, &["eval", "--task_id", "1", "--score", "3"]);

    let dest = temp.path().join("out.json");
    let output = track(home, &["export", dest.to_str().expect("utf8"), "--format", "json"]);
    assert!(output.status.success());

    let exported: Vec<Value> = serde_json::from_str(&fs::read_to_string(&dest).expect("json")).expect("parse");
    assert_eq!(exported, read_tasks(home, "demo"));
}

#[test]
fn export_unknown_format_writes_nothing() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);
    track(home, &["add", "first"]);

    let dest = temp.path().join("out.xlsx");
    let output = track(home, &["export", dest.to_str().expect("utf8"), "--format", "xlsx"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("File format xlsx not recognized."));
    assert!(!dest.exists());
}

#[test]
fn missing_current_project_is_fatal() {
    let temp = TempDir::new().expect("tempdir");

    let output = track(temp.path(), &["list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No current project"));
}

#[test]
fn dangling_field_flag_is_fatal() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);

    let output = track(home, &["add", "first", "--score"]);
    assert!(!output.status.success());
    assert!(!home.join("demo").join("tasks.json").exists());
}

#[test]
fn add_accepts_field_named_verbose() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);

    let output = track(home, &["add", "x", "--verbose", "high"]);
    assert!(output.status.success());

    let tasks = read_tasks(home, "demo");
    assert_eq!(tasks[0].get("verbose").and_then(|v| v.as_str()), Some("high"));
}

#[test]
fn eval_repeated_task_id_uses_last() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);
    track(home, &["add", "first"]);
    track(home, &["add", "second"]);

    let output = track(home, &["eval", "--task_id", "1", "--s", "1", "--task_id", "2"]);
    assert!(output.status.success());

    let tasks = read_tasks(home, "demo");
    assert!(tasks[0].get("s_eval").is_none());
    assert_eq!(tasks[1].get("s_eval").and_then(|v| v.as_str()), Some("1"));
}

#[test]
fn add_repeated_project_uses_last() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);

    let output = track(home, &["add", "x", "--project", "demo", "--n", "1", "--project", "side"]);
    assert!(output.status.success());
    assert_eq!(read_tasks(home, "side").len(), 1);
    assert!(!home.join("demo").join("tasks.json").exists());
}

#[test]
fn add_ignores_task_id_field() {
    let temp = TempDir::new().expect("tempdir");
    let home = temp.path();
    track(home, &["init", "demo"]);

    let output = track(home, &["add", "z", "--task_id", "abc"]);
    assert!(output.status.success());

    let tasks = read_tasks(home, "demo");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].get("task_id").and_then(|v| v.as_u64()), Some(1));
    let text = fs::read_to_string(home.join("demo").join("tasks.json")).expect("read");
    assert!(!text.contains("abc"));
}
