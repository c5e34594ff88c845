//! E2E integration tests for the `scenebridge` binary.
//!
//! Spawns the real binary, feeds inbound batches on stdin and checks the
//! outbound batches on stdout. Logs go to stderr.

mod common;

use common::{bridge_cmd, stdout_events};
use predicates::str::contains;
use serde_json::json;

// ─── Startup / Shutdown ────────────────────────────────────────────

#[test]
fn empty_stdin_exits_gracefully() {
    let (mut cmd, _guard) = bridge_cmd();
    cmd.write_stdin("").assert().success().stdout("");
}

#[test]
fn verbose_logs_go_to_stderr() {
    let (mut cmd, _guard) = bridge_cmd();
    cmd.arg("-v")
        .write_stdin("")
        .assert()
        .success()
        .stdout("")
        .stderr(contains("starting bridge"));
}

#[test]
fn invalid_codec_is_rejected() {
    let (mut cmd, _guard) = bridge_cmd();
    cmd.args(["--codec", "xml"]).assert().failure();
}

#[test]
fn malformed_project_config_fails() {
    let (mut cmd, guard) = bridge_cmd();
    let dir = guard.path().join(".scenebridge");
    std::fs::create_dir_all(&dir).expect("config dir");
    std::fs::write(dir.join("config.toml"), "[queue\nmax_event_count = ").expect("config file");

    cmd.write_stdin("")
        .assert()
        .failure()
        .stderr(contains("config error"));
}

// ─── Protocol ──────────────────────────────────────────────────────

#[test]
fn widget_round_trip() {
    let (mut cmd, _guard) = bridge_cmd();
    let input = concat!(
        r#"[{"event":"Create","id":"obj1","data":{"template":"Widget","update":{"visible":true},"interests":{"Clicked":{"query":{"pos":"transform/position"}}}}}]"#,
        "\n",
        r#"[{"event":"Update","id":"obj1","data":{"transform/position":{"x":1,"y":2,"z":3},"method:Click":[]}}]"#,
        "\n",
    );
    let output = cmd.write_stdin(input).assert().success().get_output().clone();

    assert_eq!(
        stdout_events(&output.stdout),
        vec![
            json!({"event": "Created", "id": "obj1"}),
            json!({"event": "Clicked", "id": "obj1", "data": {"pos": {"x": 1, "y": 2, "z": 3}}}),
        ]
    );
}

#[test]
fn bad_lines_do_not_stop_the_bridge() {
    let (mut cmd, _guard) = bridge_cmd();
    let input = concat!(
        "this is not json\n",
        r#"{"event":"Teleport","id":"x"}"#,
        "\n",
        r#"{"event":"Create","id":"n1","data":{"template":"Node"}}"#,
        "\n",
    );
    let output = cmd.write_stdin(input).assert().success().get_output().clone();

    assert_eq!(stdout_events(&output.stdout), vec![json!({"event": "Created", "id": "n1"})]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("BRIDGE_UNKNOWN_MESSAGE_KIND"));
}

#[test]
fn max_event_count_splits_batches() {
    let (mut cmd, _guard) = bridge_cmd();
    let input = concat!(
        r#"[{"event":"Create","id":"a","data":{"template":"Node"}},{"event":"Create","id":"b","data":{"template":"Node"}},{"event":"Create","id":"c","data":{"template":"Node"}}]"#,
        "\n",
    );
    let output = cmd
        .args(["--max-event-count", "2"])
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    assert_eq!(stdout.lines().count(), 2);
    assert_eq!(stdout_events(&output.stdout).len(), 3);
}

#[test]
fn project_config_selects_line_codec() {
    let (mut cmd, guard) = bridge_cmd();
    let dir = guard.path().join(".scenebridge");
    std::fs::create_dir_all(&dir).expect("config dir");
    std::fs::write(dir.join("config.toml"), "[transport]\ncodec = \"lines\"\n").expect("config file");

    let input = concat!(r#"{"event":"Create","id":"n1","data":{"template":"Node"}}"#, "\n");
    cmd.write_stdin(input)
        .assert()
        .success()
        .stdout(r#"{"event":"Created","id":"n1"}"#.to_owned() + "\n");
}

#[test]
fn query_callback_is_written_once() {
    let (mut cmd, _guard) = bridge_cmd();
    let query = r#"{"event":"Query","id":"w","data":{"query":{"t":"title"},"callbackID":"cb-7"}}"#;
    let input = format!(
        "{}\n{query}\n{query}\n",
        r#"{"event":"Create","id":"w","data":{"template":"Widget","update":{"title":"Foo"}}}"#
    );
    let output = cmd.write_stdin(input).assert().success().get_output().clone();

    assert_eq!(
        stdout_events(&output.stdout),
        vec![
            json!({"event": "Created", "id": "w"}),
            json!({"event": "Callback", "id": "w", "data": {"callbackID": "cb-7", "result": {"t": "Foo"}}}),
        ]
    );
}

#[test]
fn log_file_receives_remote_log_lines() {
    let (mut cmd, guard) = bridge_cmd();
    let logs = guard.path().join("logs");
    let input = concat!(r#"{"event":"Log","data":{"line":"hello from the controller"}}"#, "\n");
    cmd.arg("--log-file")
        .arg(&logs)
        .args(["--log-level", "info"])
        .write_stdin(input)
        .assert()
        .success();

    let written = std::fs::read_to_string(logs.join("scenebridge.log")).expect("log file written");
    assert!(written.contains("hello from the controller"));
}
