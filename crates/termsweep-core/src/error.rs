//! Error taxonomy.
//!
//! Only [`ConfigError`] aborts a run. [`FileReadError`] and
//! [`OwnerMapError`] are reported as warnings by the caller and the run
//! carries on with an empty contribution. [`ScanError::Interrupted`] means
//! the run was cancelled and nothing was written.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems detected before scanning starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no valid search term was provided")]
    EmptyTermSet,

    #[error("failed to read term list {path}: {source}")]
    TermList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scan root does not exist or is not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("failed to build matcher: {0}")]
    Matcher(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A candidate file could not be opened or read.
#[derive(Debug, Error)]
#[error("could not read {}: {source}", path.display())]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The owner map input was missing or malformed.
#[derive(Debug, Error)]
pub enum OwnerMapError {
    #[error("owner map not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read owner map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed owner map: {0}")]
    Malformed(#[from] csv::Error),
}

/// Failures of the scan stage as a whole.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan interrupted; no output was written")]
    Interrupted,

    #[error("failed to start worker pool: {0}")]
    Pool(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
