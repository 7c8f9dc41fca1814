//! Test-artifact archive extraction into the DUT directory.
//!
//! Extraction shells out to the system `tar`, which handles every
//! compression the host orchestrator might have used. A bad archive is
//! fatal: the run cannot proceed without its artifacts, so no report is
//! emitted.

use crate::error::Error;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Extracts `archive` into `dest_dir`.
///
/// # Errors
///
/// Returns an archive error when `tar` cannot be invoked or exits
/// non-zero.
pub async fn unpack_archive(archive: &Path, dest_dir: &Path) -> Result<(), Error> {
    debug!(archive = %archive.display(), dest = %dest_dir.display(), "unpacking test artifacts");
    let status = Command::new("tar")
        .arg("xf")
        .arg(archive)
        .arg("-C")
        .arg(dest_dir)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|err| Error::Archive(format!("failed to invoke tar: {err}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Archive(format!(
            "tar exited with {status} while unpacking {}",
            archive.display()
        )))
    }
}
