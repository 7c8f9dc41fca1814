//! Run orchestration: unpack, build, schedule, report.
//!
//! The orchestrator never aborts on a child failure. The only fatal paths
//! are the ones where no meaningful report exists at all: an unreadable
//! configuration, a corrupt archive, or an unwritable manifest file.

use crate::batch::BatchIter;
use crate::config::{Meta, RunnerConfig};
use crate::error::Error;
use crate::report::RunReport;
use crate::scheduler::Scheduler;
use crate::supervisor::{supervise, Invocation, ProcessOutcome};
use crate::unpack;
use std::time::Instant;
use tracing::{debug, warn};

/// Executes a full run: DUT directory setup, optional unpack, optional
/// build step, then per-batch scheduling.
///
/// When the build step ran and did not succeed, the test phase is skipped
/// entirely: `testbatches` stays empty and `total_runtime_secs` is omitted,
/// while the build outcome itself is still reported. When no build script
/// exists the test phase proceeds with `setup` as `null`.
///
/// # Errors
///
/// Returns an error on unpack failure, manifest write failure, or DUT
/// directory creation failure. Child process failures are reported, not
/// raised.
pub async fn run(config: &RunnerConfig) -> Result<RunReport, Error> {
    let run_started = Instant::now();

    tokio::fs::create_dir_all(&config.meta.local_dut_dir).await?;
    if let Some(archive) = &config.meta.local_testcase_tar_file {
        unpack::unpack_archive(archive, &config.meta.local_dut_dir).await?;
    }

    let setup = run_setup(&config.meta).await;
    if let Some(outcome) = &setup {
        if !outcome.is_success() {
            warn!(status = ?outcome.status, "build step failed, skipping the test phase");
            return Ok(RunReport {
                setup,
                testbatches: Vec::new(),
                total_runtime_secs: None,
            });
        }
    }

    let scheduler = Scheduler::new(&config.meta);
    let mut testbatches = Vec::new();
    for batch in BatchIter::new(config.testcases.clone(), config.meta.max_testbatch_size) {
        let budget_secs =
            batch.nominal_allowance_secs(config.meta.minimum_testbatch_time_secs);
        debug!(
            action = batch.action(),
            size = batch.len(),
            budget_secs,
            "scheduling initial batch"
        );
        testbatches.extend(scheduler.schedule(batch, budget_secs).await?);
    }

    Ok(RunReport {
        setup,
        testbatches,
        total_runtime_secs: Some(run_started.elapsed().as_secs_f64()),
    })
}

/// Runs the build script when one exists under the DUT directory. A missing
/// script is not an error: the DUT may need no build step at all.
async fn run_setup(meta: &Meta) -> Option<ProcessOutcome> {
    let setup_path = meta.setup_path();
    if !setup_path.is_file() {
        debug!(path = %setup_path.display(), "no build script, proceeding to tests");
        return None;
    }
    let invocation = Invocation {
        argv: vec![setup_path.to_string_lossy().into_owned()],
        deadline_secs: meta.max_setup_time_secs,
        stdout_cap_bytes: meta.limit_stdout_bytes,
        stderr_cap_bytes: meta.limit_stdout_bytes,
    };
    Some(supervise(&invocation).await)
}
