//! Report types and JSON encoding.
//!
//! The run report is the single machine-readable artifact of a run. Opaque
//! byte blobs (captured stdout/stderr) are emitted as standard base64 ASCII
//! strings; statuses serialize by their symbolic variant name.

use crate::supervisor::ProcessOutcome;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Serialize, Serializer};

/// Outcome of one solution invocation, covering the named test cases. The
/// unbisected path and every leaf of a bisection tree both emit one of
/// these.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub testcases: Vec<String>,
    pub process: ProcessOutcome,
}

/// The full run report written to stdout.
///
/// `setup` is `null` when no build script exists. `total_runtime_secs` is
/// omitted entirely when the build step failed and the test phase was
/// skipped.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub setup: Option<ProcessOutcome>,
    pub testbatches: Vec<BatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_runtime_secs: Option<f64>,
}

/// Serializes captured bytes as a standard base64 string.
///
/// # Errors
///
/// Propagates serializer failures only; the encoding itself cannot fail.
pub fn as_base64<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(data))
}
