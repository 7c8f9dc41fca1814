//! Shared test utilities for performance optimization and fixture setup

use crucible_runner::config::{Meta, TestCase};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

/// Cached binary path for the crucible CLI to avoid repeated compilation
#[allow(dead_code)]
pub static CRUCIBLE_BIN: Lazy<PathBuf> = Lazy::new(|| assert_cmd::cargo::cargo_bin("crucible"));

/// Test helper to create a command with the cached binary
#[allow(dead_code)]
pub fn crucible_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(&*CRUCIBLE_BIN)
}

/// Writes an executable `/bin/sh` fixture script.
#[allow(dead_code)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Builds a `Meta` pointing the solution at `<dut_dir>/solution` and the
/// manifest at `<work_dir>/testcases.json`, with small deterministic knobs.
#[allow(dead_code)]
pub fn test_meta(dut_dir: &Path, work_dir: &Path) -> Meta {
    serde_json::from_value(serde_json::json!({
        "local_dut_dir": dut_dir,
        "local_testcase_filename": work_dir.join("testcases.json"),
        "solution_name": "solution",
        "max_setup_time_secs": 10.0,
        "minimum_testbatch_time_secs": 5.0,
        "limit_stdout_bytes": 65536
    }))
    .unwrap()
}

/// Builds a test case with an `action`-only payload.
#[allow(dead_code)]
pub fn case(name: &str, action: &str, allowance_secs: f64) -> TestCase {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "runtime_allowance_secs": allowance_secs,
        "testcase_data": {"action": action}
    }))
    .unwrap()
}
