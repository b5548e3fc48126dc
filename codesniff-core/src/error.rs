//! Error type shared by every codesniff-core module.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::session::BufferId;

/// Everything that can go wrong between pressing "check" and drawing a result.
///
/// None of these are fatal to the host: each one ends up as a transient
/// status message and the user re-triggers the run manually.
#[derive(Debug, Error)]
pub enum SnifferError {
    /// The checker or fixer binary could not be started at all.
    #[error("failed to launch `{program}`: {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Writing the buffer to the tool or reading its output failed.
    #[error("I/O error while talking to `{program}`: {source}")]
    ProcessIo {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran but reported a processing error (exit code 3 and up, or
    /// killed by a signal when `code` is `None`).
    #[error("`{program}` failed ({}): {detail}", exit_label(.code))]
    ToolFailed {
        program: String,
        code: Option<i32>,
        detail: String,
    },

    /// The fixer wrote nothing for a non-empty buffer.
    #[error("`{program}` produced no output")]
    NoOutput { program: String },

    /// Fixer output was not valid UTF-8, so it cannot be diffed.
    #[error("diff only works with UTF-8 files")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// A hunk did not match the text it was applied to.
    #[error("patch does not apply: {0}")]
    Patch(String),

    /// The configuration file could not be read or is inconsistent.
    #[error("configuration error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// A run is already outstanding for this buffer and the overlap policy
    /// refuses to start another.
    #[error("a run is already in progress for buffer {0}")]
    RunInFlight(BufferId),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SnifferError {
    /// Creates a configuration error for `path`.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a patch error.
    pub fn patch(message: impl Into<String>) -> Self {
        Self::Patch(message.into())
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_owned(),
    }
}

/// Result alias used across the crate.
pub type Result<T, E = SnifferError> = std::result::Result<T, E>;
