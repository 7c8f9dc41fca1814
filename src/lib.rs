//! Crucible: in-container batch runner for known-answer testing.
//!
//! The binary is handed a JSON run configuration by the host orchestrator,
//! builds the device-under-test, runs the solution executable against
//! batched test cases under per-batch wall-clock budgets, bisects failing
//! batches to localize offenders, and emits a single JSON report on stdout.

#[cfg(not(unix))]
compile_error!(
    "crucible runs inside Unix containers; signal classification and \
     executable-permission diagnosis have no equivalent on this target"
);

pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod supervisor;
pub mod unpack;
