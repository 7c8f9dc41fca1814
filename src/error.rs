//! Error handling for the Crucible runner.
//!
//! Child process failures are never errors: the supervisor records them as
//! values inside a [`crate::supervisor::ProcessOutcome`] and the run carries
//! on. This type covers only the fatal paths where no report can be emitted
//! at all, such as an unreadable configuration or a corrupt test archive.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Archive error: {0}")]
    Archive(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error from any message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
