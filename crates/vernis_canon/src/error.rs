//! Error types for program construction.

use std::path::PathBuf;
use vernis_sfc::SfcError;

/// Errors raised by a [`SourceHost`](crate::SourceHost).
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A composite document could not be scanned.
    #[error("SFC error: {0}")]
    Sfc(#[from] SfcError),
}

/// Error type for program operations.
#[derive(Debug, thiserror::Error)]
pub enum CanonError {
    /// The tsconfig file is missing, unreadable or malformed.
    #[error("invalid tsconfig {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// A directory could not be walked while expanding the file set.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be loaded.
    #[error("{0}")]
    Host(#[from] HostError),
}

/// Result type for program operations.
pub type CanonResult<T> = Result<T, CanonError>;
