//! Orchestrator tests: DUT directory handling, archive unpack, build-step
//! gating, and full-run report assembly at the library level.

mod common;

use common::write_script;
use crucible_runner::config::RunnerConfig;
use crucible_runner::error::Error;
use crucible_runner::runner;
use crucible_runner::supervisor::ProcessStatus;
use std::path::Path;
use tempfile::TempDir;

fn config_with(dir: &Path, meta_extra: serde_json::Value, testcases: serde_json::Value) -> RunnerConfig {
    let mut meta = serde_json::json!({
        "local_dut_dir": dir.join("dut"),
        "local_testcase_filename": dir.join("testcases.json"),
        "solution_name": "solution",
        "max_setup_time_secs": 10.0,
        "minimum_testbatch_time_secs": 2.0,
        "max_testbatch_size": 4
    });
    meta.as_object_mut()
        .unwrap()
        .extend(meta_extra.as_object().unwrap().clone());
    let config: RunnerConfig =
        serde_json::from_value(serde_json::json!({ "meta": meta, "testcases": testcases })).unwrap();
    config.validate().unwrap();
    config
}

fn three_cases() -> serde_json::Value {
    serde_json::json!([
        {"name": "a", "runtime_allowance_secs": 1.0, "testcase_data": {"action": "add"}},
        {"name": "b", "runtime_allowance_secs": 1.0, "testcase_data": {"action": "add"}},
        {"name": "c", "runtime_allowance_secs": 1.0, "testcase_data": {"action": "add"}}
    ])
}

#[tokio::test]
async fn test_failed_build_step_skips_the_test_phase() {
    let dir = TempDir::new().unwrap();
    let config = config_with(dir.path(), serde_json::json!({}), three_cases());
    std::fs::create_dir_all(&config.meta.local_dut_dir).unwrap();
    write_script(&config.meta.setup_path(), "#!/bin/sh\nexit 2\n");
    write_script(&config.meta.solution_path(), "#!/bin/sh\nexit 0\n");

    let report = runner::run(&config).await.unwrap();

    let setup = report.setup.unwrap();
    assert_eq!(setup.status, ProcessStatus::FailedReturnCode);
    assert_eq!(setup.returncode, Some(2));
    assert!(report.testbatches.is_empty());
    assert!(report.total_runtime_secs.is_none());
}

#[tokio::test]
async fn test_successful_build_step_is_reported_and_tests_run() {
    let dir = TempDir::new().unwrap();
    let config = config_with(dir.path(), serde_json::json!({}), three_cases());
    std::fs::create_dir_all(&config.meta.local_dut_dir).unwrap();
    write_script(&config.meta.setup_path(), "#!/bin/sh\nexit 0\n");
    write_script(&config.meta.solution_path(), "#!/bin/sh\nexit 0\n");

    let report = runner::run(&config).await.unwrap();

    assert!(report.setup.unwrap().is_success());
    assert_eq!(report.testbatches.len(), 1);
    assert!(report.testbatches[0].process.is_success());
    assert!(report.total_runtime_secs.is_some());
}

#[tokio::test]
async fn test_missing_build_script_reports_null_setup_and_proceeds() {
    let dir = TempDir::new().unwrap();
    let config = config_with(dir.path(), serde_json::json!({}), three_cases());
    std::fs::create_dir_all(&config.meta.local_dut_dir).unwrap();
    write_script(&config.meta.solution_path(), "#!/bin/sh\nexit 0\n");

    let report = runner::run(&config).await.unwrap();

    assert!(report.setup.is_none());
    assert_eq!(report.testbatches.len(), 1);
    assert!(report.total_runtime_secs.is_some());
}

#[tokio::test]
async fn test_dut_directory_is_created_when_missing() {
    let dir = TempDir::new().unwrap();
    let config = config_with(dir.path(), serde_json::json!({}), serde_json::json!([]));
    assert!(!config.meta.local_dut_dir.exists());

    let report = runner::run(&config).await.unwrap();

    assert!(config.meta.local_dut_dir.is_dir());
    assert!(report.setup.is_none());
    assert!(report.testbatches.is_empty());
    assert!(report.total_runtime_secs.is_some());
}

#[tokio::test]
async fn test_archive_is_unpacked_into_the_dut_directory() {
    let dir = TempDir::new().unwrap();
    let staging = dir.path().join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    write_script(&staging.join("solution"), "#!/bin/sh\nexit 0\n");
    let archive = dir.path().join("artifacts.tar");
    let packed = std::process::Command::new("tar")
        .arg("cf")
        .arg(&archive)
        .arg("-C")
        .arg(&staging)
        .arg("solution")
        .status()
        .unwrap();
    assert!(packed.success());

    let config = config_with(
        dir.path(),
        serde_json::json!({"local_testcase_tar_file": archive}),
        three_cases(),
    );
    let report = runner::run(&config).await.unwrap();

    assert!(config.meta.solution_path().is_file());
    assert_eq!(report.testbatches.len(), 1);
    assert!(report.testbatches[0].process.is_success());
}

#[tokio::test]
async fn test_corrupt_archive_is_fatal() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("broken.tar");
    std::fs::write(&archive, b"this is not a tar archive").unwrap();

    let config = config_with(
        dir.path(),
        serde_json::json!({"local_testcase_tar_file": archive}),
        serde_json::json!([]),
    );
    let err = runner::run(&config).await.unwrap_err();
    assert!(matches!(err, Error::Archive(_)));
}

#[tokio::test]
async fn test_batches_execute_in_input_order_across_actions() {
    let dir = TempDir::new().unwrap();
    let testcases = serde_json::json!([
        {"name": "a1", "runtime_allowance_secs": 1.0, "testcase_data": {"action": "add"}},
        {"name": "a2", "runtime_allowance_secs": 1.0, "testcase_data": {"action": "add"}},
        {"name": "s1", "runtime_allowance_secs": 1.0, "testcase_data": {"action": "sub"}},
        {"name": "a3", "runtime_allowance_secs": 1.0, "testcase_data": {"action": "add"}}
    ]);
    let config = config_with(dir.path(), serde_json::json!({}), testcases);
    std::fs::create_dir_all(&config.meta.local_dut_dir).unwrap();
    write_script(&config.meta.solution_path(), "#!/bin/sh\nexit 0\n");

    let report = runner::run(&config).await.unwrap();

    let names: Vec<Vec<String>> = report
        .testbatches
        .iter()
        .map(|r| r.testcases.clone())
        .collect();
    assert_eq!(names, vec![vec!["a1", "a2"], vec!["s1"], vec!["a3"]]);
}
