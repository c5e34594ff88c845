//! Shared E2E test helpers for `scenebridge` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Environment variables read by the config loader.
const CONFIG_VARS: &[&str] = &[
    "SCENEBRIDGE_DEBUG",
    "SCENEBRIDGE_MAX_EVENT_COUNT",
    "SCENEBRIDGE_TICK_MS",
    "SCENEBRIDGE_MAX_EVENT_DEPTH",
    "SCENEBRIDGE_CODEC",
    "SCENEBRIDGE_LOG_FILE",
];

/// Build a Command isolated from the caller's config.
///
/// The project directory is a fresh tempdir and global config is skipped.
/// Returns (command, guard). Keep the guard alive for the whole test.
pub fn bridge_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp project dir");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("scenebridge");
    cmd.timeout(TIMEOUT_BASIC);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd.args(["--no-global-config", "-C"]);
    cmd.arg(tmp.path());
    (cmd, tmp)
}

/// Decodes every stdout line as a JSON array batch and flattens them.
pub fn stdout_events(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .flat_map(|line| match serde_json::from_str::<Value>(line).expect("stdout line is JSON") {
            Value::Array(items) => items,
            other => vec![other],
        })
        .collect()
}
