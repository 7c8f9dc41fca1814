//! Run configuration loading and validation.
//!
//! The host orchestrator writes a single JSON document into the container:
//! a `meta` mapping with the runner options and an ordered `testcases`
//! sequence. The document is parsed once at startup and is immutable for
//! the life of the process. Unknown `meta` keys are ignored so the host
//! side can grow options without breaking older runners.

use crate::constants;
use crate::error::Error;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The full run configuration: runner options plus the ordered test cases.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    pub meta: Meta,
    pub testcases: Vec<TestCase>,
}

/// Recognized options of the `meta` section.
///
/// Every field except `local_dut_dir`, `local_testcase_filename` and
/// `solution_name` has a default in [`crate::constants`].
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    /// Absolute path to the DUT directory; created if missing.
    pub local_dut_dir: PathBuf,

    /// Optional archive to extract into the DUT directory before the run.
    #[serde(default)]
    pub local_testcase_tar_file: Option<PathBuf>,

    /// Path the per-batch manifest is written to before each solution
    /// invocation.
    pub local_testcase_filename: PathBuf,

    /// Filename of the build script under the DUT directory. The script is
    /// optional at runtime: when absent, the test phase runs without a
    /// build step.
    #[serde(default = "default_setup_name")]
    pub setup_name: String,

    /// Filename of the solution executable under the DUT directory.
    pub solution_name: String,

    /// Deadline for the build script, in seconds.
    #[serde(default = "default_max_setup_time_secs")]
    pub max_setup_time_secs: f64,

    /// Cardinality cap per initial batch.
    #[serde(default = "default_max_testbatch_size")]
    pub max_testbatch_size: usize,

    /// Additive floor of the per-batch allowance, in seconds.
    #[serde(default = "default_minimum_testbatch_time_secs")]
    pub minimum_testbatch_time_secs: f64,

    /// Head-truncation cap for captured stdout and stderr of every
    /// subprocess. One knob caps both streams.
    #[serde(default = "default_limit_stdout_bytes")]
    pub limit_stdout_bytes: usize,

    /// Emit diagnostic lines to stderr.
    #[serde(default)]
    pub debug: bool,
}

/// One test case: a unique name, its runtime allowance, and the opaque
/// payload forwarded verbatim to the DUT.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub runtime_allowance_secs: f64,
    pub testcase_data: Value,
}

impl TestCase {
    /// The action tag used as the batching key. Validation guarantees the
    /// tag is present on every loaded case.
    #[must_use]
    pub fn action(&self) -> &str {
        self.testcase_data
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

impl Meta {
    /// Path of the build script inside the DUT directory.
    #[must_use]
    pub fn setup_path(&self) -> PathBuf {
        self.local_dut_dir.join(&self.setup_name)
    }

    /// Path of the solution executable inside the DUT directory.
    #[must_use]
    pub fn solution_path(&self) -> PathBuf {
        self.local_dut_dir.join(&self.solution_name)
    }
}

impl RunnerConfig {
    /// Loads and validates a run configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// violates the structural rules checked by [`RunnerConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the structural rules the rest of the runner relies on.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_testbatch_size` is zero, a
    /// case name repeats, an allowance is negative or not finite, or a
    /// `testcase_data` payload is missing its `action` string.
    pub fn validate(&self) -> Result<(), Error> {
        if self.meta.max_testbatch_size == 0 {
            return Err(Error::invalid_config("max_testbatch_size must be >= 1"));
        }

        let mut seen = HashSet::with_capacity(self.testcases.len());
        for case in &self.testcases {
            if !seen.insert(case.name.as_str()) {
                return Err(Error::invalid_config(format!(
                    "duplicate testcase name '{}'",
                    case.name
                )));
            }
            if !case.runtime_allowance_secs.is_finite() || case.runtime_allowance_secs < 0.0 {
                return Err(Error::invalid_config(format!(
                    "testcase '{}' has invalid runtime_allowance_secs {}",
                    case.name, case.runtime_allowance_secs
                )));
            }
            let action_present = case
                .testcase_data
                .get("action")
                .is_some_and(Value::is_string);
            if !action_present {
                return Err(Error::invalid_config(format!(
                    "testcase '{}' is missing a string 'action' in testcase_data",
                    case.name
                )));
            }
        }
        Ok(())
    }
}

fn default_setup_name() -> String {
    constants::DEFAULT_SETUP_NAME.to_string()
}

const fn default_max_setup_time_secs() -> f64 {
    constants::DEFAULT_MAX_SETUP_TIME_SECS
}

const fn default_max_testbatch_size() -> usize {
    constants::DEFAULT_MAX_TESTBATCH_SIZE
}

const fn default_minimum_testbatch_time_secs() -> f64 {
    constants::DEFAULT_MINIMUM_TESTBATCH_TIME_SECS
}

const fn default_limit_stdout_bytes() -> usize {
    constants::DEFAULT_LIMIT_STDOUT_BYTES
}
