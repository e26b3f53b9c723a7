use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn gt_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gt").expect("binary");
    cmd.current_dir(dir)
        .env_remove("GOALTRACK_STORE")
        .env_remove("RUST_LOG");
    cmd
}

fn gt_json(dir: &Path, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
    let output = gt_cmd(dir).args(args).arg("--json").output()?;
    if !output.status.success() {
        return Err(format!(
            "gt {args:?} failed: {}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

fn id_of(value: &Value) -> String {
    value["data"]["id"].as_str().unwrap_or_default().to_string()
}

#[test]
fn help_lists_command_groups() {
    Command::cargo_bin("gt")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("goal"))
        .stdout(contains("task"))
        .stdout(contains("daily"));
}

#[test]
fn init_creates_store_and_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    gt_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("gt initialized"));

    assert!(dir.path().join(".goaltrack.toml").exists());
    assert!(dir.path().join(".goaltrack").join("store.json").exists());

    let again = gt_json(dir.path(), &["init"])?;
    assert_eq!(again["command"], "init");
    assert_eq!(again["data"]["created"]["store"], false);
    assert_eq!(again["data"]["created"]["config"], false);
    Ok(())
}

#[test]
fn goal_progress_tracks_task_completion() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let goal = gt_json(dir.path(), &["goal", "new", "Ship v1"])?;
    assert_eq!(goal["status"], "success");
    let goal_id = id_of(&goal);

    let mut task_ids = Vec::new();
    for title in ["Design", "Build", "Release"] {
        let task = gt_json(dir.path(), &["task", "new", title, "--goal", &goal_id])?;
        assert_eq!(task["data"]["goal_id"], goal_id.as_str());
        task_ids.push(id_of(&task));
    }

    gt_json(dir.path(), &["task", "done", &task_ids[0]])?;
    gt_json(dir.path(), &["task", "done", &task_ids[1]])?;
    let shown = gt_json(dir.path(), &["goal", "show", &goal_id])?;
    assert_eq!(shown["data"]["progress"], 67);
    assert_eq!(shown["data"]["status"], "active");
    assert_eq!(shown["data"]["tasks"].as_array().map(Vec::len), Some(3));

    gt_json(dir.path(), &["task", "done", &task_ids[2]])?;
    let listed = gt_json(dir.path(), &["goal", "list"])?;
    assert_eq!(listed["data"][0]["progress"], 100);
    assert_eq!(listed["data"][0]["status"], "completed");
    assert_eq!(listed["data"][0]["done_tasks"], 3);
    Ok(())
}

#[test]
fn blocked_completion_exits_with_rule_code() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let goal_id = id_of(&gt_json(dir.path(), &["goal", "new", "Kitchen"])?);
    let paint = id_of(&gt_json(
        dir.path(),
        &["task", "new", "Buy paint", "--goal", &goal_id],
    )?);
    let walls = id_of(&gt_json(
        dir.path(),
        &["task", "new", "Paint walls", "--goal", &goal_id, "--depends-on", &paint],
    )?);

    let output = gt_cmd(dir.path())
        .args(["task", "done", &walls, "--json"])
        .output()?;
    assert_eq!(output.status.code(), Some(3));
    let body: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(body["status"], "error");
    assert_eq!(body["command"], "task done");
    assert_eq!(body["error"]["kind"], "rule_blocked");
    assert_eq!(body["error"]["details"]["blockers"][0], "Buy paint");

    gt_cmd(dir.path())
        .args(["task", "done", &walls])
        .assert()
        .code(3)
        .stderr(contains("blocked by: Buy paint"));

    gt_json(dir.path(), &["task", "done", &paint])?;
    let done = gt_json(dir.path(), &["task", "done", &walls])?;
    assert_eq!(done["data"]["status"], "done");
    Ok(())
}

#[test]
fn dependency_cycle_is_refused() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let a = id_of(&gt_json(dir.path(), &["task", "new", "A"])?);
    let b = id_of(&gt_json(dir.path(), &["task", "new", "B", "--depends-on", &a])?);

    gt_cmd(dir.path())
        .args(["task", "update", &a, "--depends-on", &b])
        .assert()
        .code(3)
        .stderr(contains("cycle"));
    Ok(())
}

#[test]
fn rm_without_cascade_promotes_children() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let goal_id = id_of(&gt_json(dir.path(), &["goal", "new", "House"])?);
    let parent = id_of(&gt_json(
        dir.path(),
        &["task", "new", "Renovate", "--goal", &goal_id],
    )?);
    let child = id_of(&gt_json(
        dir.path(),
        &["task", "new", "Floors", "--goal", &goal_id, "--parent", &parent],
    )?);

    let removed = gt_json(dir.path(), &["task", "rm", &parent])?;
    assert_eq!(removed["data"]["deleted"][0], parent.as_str());
    assert_eq!(removed["data"]["reparented"][0], child.as_str());

    let tasks = gt_json(dir.path(), &["task", "list", "--goal", &goal_id])?;
    assert_eq!(tasks["data"][0]["id"], child.as_str());
    assert!(tasks["data"][0]["parent_task_id"].is_null());
    Ok(())
}

#[test]
fn daily_done_and_history() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let task = id_of(&gt_json(dir.path(), &["task", "new", "Stretch"])?);
    gt_json(dir.path(), &["task", "new", "Read"])?;

    let marked = gt_json(dir.path(), &["daily", "done", &task, "--date", "2024-03-02"])?;
    assert_eq!(marked["data"]["completion_date"], "2024-03-02");

    let view = gt_json(dir.path(), &["daily", "view", "--date", "2024-03-02"])?;
    assert_eq!(view["data"]["today"].as_array().map(Vec::len), Some(2));
    let yesterday = gt_json(dir.path(), &["daily", "view", "--date", "2024-03-03"])?;
    assert_eq!(yesterday["data"]["yesterday"][0]["id"], task.as_str());

    let history = gt_json(
        dir.path(),
        &["daily", "history", "--days", "3", "--date", "2024-03-02"],
    )?;
    let days = history["data"]["days"].as_array().cloned().unwrap_or_default();
    assert_eq!(days.len(), 3);
    assert_eq!(days[2]["date"], "2024-03-02");
    assert_eq!(days[2]["completed_tasks"], 1);
    assert_eq!(days[2]["completion_rate"], 50);
    assert_eq!(history["data"]["current_streak"], 0);
    Ok(())
}

#[test]
fn events_flag_writes_json_lines() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let output = gt_cmd(dir.path())
        .args(["goal", "new", "Evented", "--events", "-"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let events: Vec<Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["schema_version"], "goaltrack.event.v1");
    assert_eq!(events[0]["event"], "goal_created");
    assert_eq!(events[0]["data"]["title"], "Evented");
    Ok(())
}

#[test]
fn unknown_task_is_a_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    gt_cmd(dir.path())
        .args(["task", "show", "t-missing"])
        .assert()
        .code(2)
        .stderr(contains("Task not found"));
    Ok(())
}

#[test]
fn store_flag_overrides_working_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = dir.path().join("elsewhere").join("store.json");
    let store_arg = store.to_string_lossy().to_string();
    gt_json(dir.path(), &["goal", "new", "Remote", "--store", &store_arg])?;

    assert!(store.exists());
    assert!(!dir.path().join(".goaltrack").exists());
    Ok(())
}
