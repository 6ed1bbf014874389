//! Error type shared by the splitter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = SplitError> = std::result::Result<T, E>;

/// Failures that abort a split.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Input path does not exist, is not a regular file, or an output parent is missing.
    #[error("not found: {}", path.display())]
    NotFound {
        /// Path that could not be resolved.
        path: PathBuf,
    },
    /// Read, write or create failure on a specific path.
    #[error("io error while processing {}: {source}", path.display())]
    Io {
        /// Underlying error from the standard library.
        source: io::Error,
        /// File or directory being processed.
        path: PathBuf,
    },
    /// Size budget rejected before any file was touched.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SplitError {
    /// Wraps an IO error together with the path it happened on.
    pub fn io(source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    /// Like [`SplitError::io`], but a `NotFound` kind becomes [`SplitError::NotFound`].
    pub fn from_io(source: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { source, path }
        }
    }
}
