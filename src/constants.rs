//! Centralized constants and configuration defaults for the Crucible runner.
//!
//! Every knob the host orchestrator can leave out of the `meta` section gets
//! its default value here, next to the fixed limits of the batching rules.

/// Aggregate expected-runtime cap per initial batch, in seconds. A batch is
/// closed as soon as the sum of its members' allowances reaches this value.
pub const AGGREGATE_ALLOWANCE_CAP_SECS: f64 = 60.0;

/// Default cardinality cap per initial batch.
pub const DEFAULT_MAX_TESTBATCH_SIZE: usize = 1;

/// Default filename of the build script under the DUT directory.
pub const DEFAULT_SETUP_NAME: &str = "setup";

/// Default deadline for the build script, in seconds.
pub const DEFAULT_MAX_SETUP_TIME_SECS: f64 = 300.0;

/// Default additive floor of the per-batch allowance, absorbing subprocess
/// startup cost.
pub const DEFAULT_MINIMUM_TESTBATCH_TIME_SECS: f64 = 5.0;

/// Default head-truncation cap for captured stdout and stderr, in bytes.
/// One knob caps both streams.
pub const DEFAULT_LIMIT_STDOUT_BYTES: usize = 1024 * 1024;
