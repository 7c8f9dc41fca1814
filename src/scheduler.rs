//! Time-budgeted bisection scheduling of test batches.
//!
//! A batch runs as one solution invocation, so a batch-level failure says
//! nothing about which member is at fault. The scheduler localizes the
//! offender by halving the batch and re-running both halves, but only while
//! the budget holds out: wall time already consumed by a failed attempt is
//! deducted from the remaining budget, and child budgets are scaled down so
//! siblings can never spend more than what the parent had left.

use crate::batch::Batch;
use crate::config::Meta;
use crate::error::Error;
use crate::report::BatchResult;
use crate::supervisor::{supervise, Invocation, ProcessOutcome};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// Runs batches against the solution executable under time budgets.
pub struct Scheduler<'a> {
    meta: &'a Meta,
}

impl<'a> Scheduler<'a> {
    #[must_use]
    pub const fn new(meta: &'a Meta) -> Self {
        Self { meta }
    }

    /// Runs one batch under the given wall-clock budget, bisecting on
    /// failure while time allows. Results arrive in depth-first, left-first
    /// order, so the concatenation of their case names always equals the
    /// input batch's case names.
    ///
    /// # Errors
    ///
    /// Returns an error only when a per-batch manifest cannot be written;
    /// child failures of any kind are recorded in the returned results.
    pub async fn schedule(
        &self,
        batch: Batch,
        runtime_allowance_secs: f64,
    ) -> Result<Vec<BatchResult>, Error> {
        let mut results = Vec::new();
        let mut worklist = vec![(batch, runtime_allowance_secs)];

        // LIFO with right pushed before left gives the depth-first,
        // left-first traversal of the bisection tree.
        while let Some((batch, budget_secs)) = worklist.pop() {
            let attempt_started = Instant::now();
            let outcome = self.attempt(&batch, budget_secs).await?;
            let elapsed_secs = attempt_started.elapsed().as_secs_f64();

            if outcome.is_success() || batch.len() <= 1 {
                results.push(BatchResult {
                    testcases: batch.names(),
                    process: outcome,
                });
                continue;
            }

            let remaining_secs = budget_secs - elapsed_secs;
            let nominal_secs =
                batch.nominal_allowance_secs(self.meta.minimum_testbatch_time_secs);
            if remaining_secs > nominal_secs / 2.0 {
                let scale = remaining_secs / nominal_secs;
                let (left, right) = batch.split();
                let left_budget = left
                    .nominal_allowance_secs(self.meta.minimum_testbatch_time_secs)
                    * scale;
                let right_budget = right
                    .nominal_allowance_secs(self.meta.minimum_testbatch_time_secs)
                    * scale;
                debug!(
                    left = ?left.names(),
                    right = ?right.names(),
                    remaining_secs,
                    scale,
                    "bisecting failed batch"
                );
                worklist.push((right, right_budget));
                worklist.push((left, left_budget));
            } else {
                debug!(
                    testcases = ?batch.names(),
                    remaining_secs,
                    nominal_secs,
                    "budget exhausted, surrendering with batch-level failure"
                );
                results.push(BatchResult {
                    testcases: batch.names(),
                    process: outcome,
                });
            }
        }

        Ok(results)
    }

    async fn attempt(&self, batch: &Batch, deadline_secs: f64) -> Result<ProcessOutcome, Error> {
        self.write_manifest(batch).await?;
        let invocation = Invocation {
            argv: vec![
                self.meta.solution_path().to_string_lossy().into_owned(),
                self.meta
                    .local_testcase_filename
                    .to_string_lossy()
                    .into_owned(),
            ],
            deadline_secs,
            stdout_cap_bytes: self.meta.limit_stdout_bytes,
            stderr_cap_bytes: self.meta.limit_stdout_bytes,
        };
        Ok(supervise(&invocation).await)
    }

    /// Rewrites the per-batch manifest the solution reads, keyed by case
    /// name in batch order. Prior content is always overwritten.
    async fn write_manifest(&self, batch: &Batch) -> Result<(), Error> {
        let mut testcases = IndexMap::with_capacity(batch.len());
        for case in batch.cases() {
            testcases.insert(case.name.clone(), case.testcase_data.clone());
        }
        let manifest = Manifest { testcases };
        tokio::fs::write(
            &self.meta.local_testcase_filename,
            serde_json::to_vec(&manifest)?,
        )
        .await?;
        Ok(())
    }
}

/// Wire format of the per-batch manifest file. The map keeps batch order.
#[derive(Serialize)]
struct Manifest {
    testcases: IndexMap<String, Value>,
}
