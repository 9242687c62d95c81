//! Fatal errors of a command run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use vernis_canon::CanonError;

/// Errors that abort a run (exit code 2).
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read lint config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid lint config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error(transparent)]
    Canon(#[from] CanonError),
}
