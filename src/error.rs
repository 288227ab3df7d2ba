//! Error taxonomy for the install pipeline.
//!
//! Every variant is fatal: the installer never retries and never continues
//! after a failed step.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    /// The releases endpoint was unreachable or answered with a non-success status.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The release data was empty or did not have the expected shape.
    #[error("no release found: {0}")]
    NotFound(String),

    /// Fetching or writing the artifact failed.
    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// A directory, file, permission, or link operation failed.
    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An operation was asked to run on an OS family that does not support it.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The host lacks something the installed tool needs to run.
    #[error("environment check failed: {0}")]
    Environment(String),
}

impl InstallError {
    pub fn network(message: impl Into<String>, source: Option<reqwest::Error>) -> Self {
        InstallError::Network {
            message: message.into(),
            source,
        }
    }

    pub fn download(url: impl Into<String>, message: impl ToString) -> Self {
        InstallError::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn fs(action: &'static str, path: &Path, source: io::Error) -> Self {
        InstallError::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Attaches a filesystem action and path to an `io::Result`.
pub trait FsContext<T> {
    fn fs_context(self, action: &'static str, path: &Path) -> Result<T, InstallError>;
}

impl<T> FsContext<T> for io::Result<T> {
    fn fs_context(self, action: &'static str, path: &Path) -> Result<T, InstallError> {
        self.map_err(|e| InstallError::fs(action, path, e))
    }
}
