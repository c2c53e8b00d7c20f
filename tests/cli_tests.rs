#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_compute_prints_critical_path() {
    run_cli("add 1 Dig 3\nadd 2 Pour 2 1\nadd 3 Paint 1 1\ncompute\nquit\n")
        .success()
        .stdout(str_contains("Project duration: 5"))
        .stdout(str_contains("Critical path: Dig -> Pour"))
        .stdout(str_contains("activities=3 critical=2 duration=5 path=1->2"));
}

#[test]
fn cli_reports_cycles_without_exiting() {
    run_cli("add 1 A 1 2\nadd 2 B 1 1\ncompute\nshow\nquit\n")
        .success()
        .stdout(str_contains("dependency cycle detected among activities [1, 2]"));
}

#[test]
fn cli_rejects_zero_duration() {
    run_cli("add 1 Nothing 0\nquit\n")
        .success()
        .stdout(str_contains("non-positive duration"));
}

#[test]
fn cli_delete_command_removes_activity() {
    run_cli("add 1 TaskA 5\nadd 2 TaskB 3 1\ndelete 2\nquit\n")
        .success()
        .stdout(str_contains("Deleted activity 2."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "add 1 TaskPersist 4\nsave json {}\nadd 2 Scratchpad 1\nload json {}\nshow\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Project loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Project loaded from")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("TaskPersist"),
        "expected persisted activity to remain"
    );
    assert!(
        !after_reload.contains("Scratchpad"),
        "expected unsaved activity to be gone after reload"
    );
}
