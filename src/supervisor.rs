//! Subprocess supervision: one child at a time, under a wall-clock deadline.
//!
//! The supervisor launches a child process, drains stdout and stderr while it
//! runs, kills it when the deadline elapses, and classifies whatever happened
//! into a closed [`ProcessStatus`] set. Failures of the child are values, not
//! errors: every exit path of this module produces a [`ProcessOutcome`] so
//! the scheduler can decide what to do next.

use crate::report;
use serde::Serialize;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

/// Terminal classification of one supervised child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessStatus {
    /// Child exited with code 0.
    Success,
    /// Child exited with a nonzero code that is not the OOM signal.
    FailedReturnCode,
    /// Child was terminated by the kernel OOM killer (SIGKILL).
    FailedOutOfMemory,
    /// Deadline elapsed and the child was killed.
    FailedTimeout,
    /// Spawn failed with a permissions error.
    FailedNotExecutable,
    /// Spawn failed with any other OS error.
    FailedExecException,
}

/// One captured output stream. `length` is the byte count before truncation;
/// `data` carries at most the configured cap, taken from the head.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedStream {
    pub length: usize,
    #[serde(serialize_with = "report::as_base64")]
    pub data: Vec<u8>,
}

impl CapturedStream {
    fn truncated(full: Vec<u8>, cap_bytes: usize) -> Self {
        let length = full.len();
        let mut data = full;
        data.truncate(cap_bytes);
        Self { length, data }
    }
}

/// Everything known about one supervised child after it is gone. Optional
/// fields are present depending on `status`; see the report format.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub cmd: Vec<String>,
    pub runtime_limit_secs: f64,
    pub runtime_secs: f64,
    pub status: ProcessStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<CapturedStream>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<CapturedStream>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returncode: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perms: Option<String>,
}

impl ProcessOutcome {
    /// True when the child exited cleanly with code 0.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ProcessStatus::Success
    }
}

/// One child invocation: argv plus its limits. `argv` must be non-empty;
/// `argv[0]` is the executable.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub deadline_secs: f64,
    pub stdout_cap_bytes: usize,
    pub stderr_cap_bytes: usize,
}

/// Runs `argv[0]` with the remaining arguments, enforcing the wall-clock
/// deadline and output caps. Never returns an error: spawn failures,
/// timeouts and bad exits all come back as classified outcomes.
///
/// The child is always reaped before this returns, on every path.
pub async fn supervise(invocation: &Invocation) -> ProcessOutcome {
    let started = Instant::now();
    debug!(
        cmd = ?invocation.argv,
        deadline_secs = invocation.deadline_secs,
        "spawning child"
    );

    let mut command = Command::new(&invocation.argv[0]);
    command
        .args(&invocation.argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => return spawn_failure(invocation, &err, started),
    };

    // Drain both pipes concurrently with the wait so a child that fills a
    // pipe buffer cannot deadlock against the deadline, and a child killed
    // at the deadline still yields its partial output.
    let stdout_task = tokio::spawn(drain_pipe(child.stdout.take()));
    let stderr_task = tokio::spawn(drain_pipe(child.stderr.take()));

    let deadline = Duration::from_secs_f64(invocation.deadline_secs.max(0.0));
    let (status, returncode, exception_msg) = match timeout(deadline, child.wait()).await {
        Ok(Ok(exit)) => classify_exit(exit),
        Ok(Err(err)) => (
            ProcessStatus::FailedExecException,
            None,
            Some(format!("failed to await child: {err}")),
        ),
        Err(_) => {
            let _ = child.kill().await;
            (
                ProcessStatus::FailedTimeout,
                None,
                Some(format!(
                    "process exceeded the {:.1} s deadline and was killed",
                    invocation.deadline_secs
                )),
            )
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();
    let runtime_secs = started.elapsed().as_secs_f64();
    debug!(?status, runtime_secs, "child finished");

    ProcessOutcome {
        cmd: invocation.argv.clone(),
        runtime_limit_secs: invocation.deadline_secs,
        runtime_secs,
        status,
        stdout: Some(CapturedStream::truncated(
            stdout,
            invocation.stdout_cap_bytes,
        )),
        stderr: Some(CapturedStream::truncated(
            stderr,
            invocation.stderr_cap_bytes,
        )),
        returncode,
        exception_msg,
        perms: None,
    }
}

async fn drain_pipe<R>(pipe: Option<R>) -> Vec<u8>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buffer).await;
    }
    buffer
}

/// Maps a clean exit into a status. Signal-terminated children report a
/// negative return code equal to the signal number; only SIGKILL is read as
/// the OOM killer's signature.
fn classify_exit(exit: ExitStatus) -> (ProcessStatus, Option<i32>, Option<String>) {
    let code = exit
        .code()
        .or_else(|| exit.signal().map(|signal| -signal));
    match code {
        Some(0) => (ProcessStatus::Success, Some(0), None),
        Some(code) if code == -libc::SIGKILL => (
            ProcessStatus::FailedOutOfMemory,
            Some(code),
            Some("process was killed by the out-of-memory killer (SIGKILL)".to_string()),
        ),
        Some(code) => (
            ProcessStatus::FailedReturnCode,
            Some(code),
            Some(format!("process exited with return code {code}")),
        ),
        None => (
            ProcessStatus::FailedReturnCode,
            None,
            Some("process terminated without an exit status".to_string()),
        ),
    }
}

fn spawn_failure(
    invocation: &Invocation,
    err: &std::io::Error,
    started: Instant,
) -> ProcessOutcome {
    let (status, perms) = if err.kind() == std::io::ErrorKind::PermissionDenied {
        let perms = std::fs::metadata(&invocation.argv[0])
            .ok()
            .map(|meta| format!("{:o}", meta.permissions().mode() & 0o7777));
        (ProcessStatus::FailedNotExecutable, perms)
    } else {
        (ProcessStatus::FailedExecException, None)
    };
    debug!(cmd = ?invocation.argv, ?status, "spawn failed");

    ProcessOutcome {
        cmd: invocation.argv.clone(),
        runtime_limit_secs: invocation.deadline_secs,
        runtime_secs: started.elapsed().as_secs_f64(),
        status,
        stdout: None,
        stderr: None,
        returncode: None,
        exception_msg: Some(err.to_string()),
        perms,
    }
}
