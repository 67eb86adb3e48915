//! Error types for fibermap operations.
//!
//! [`FibermapError`] covers the conditions that stop a generation run. Data
//! problems that only affect one branch of a tree are not errors; they are
//! collected as [`Issue`](crate::report::Issue)s in the generation report.

use std::{io, path::PathBuf};

use thiserror::Error;

use fibermap_core::{identifier::Id, repository::RepositoryError};
use fibermap_store::StoreError;

/// The main error type for fibermap operations.
#[derive(Debug, Error)]
pub enum FibermapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The network document could not be read or parsed.
    #[error("Failed to load network `{}`: {err}", path.display())]
    Load {
        path: PathBuf,
        /// Document text, empty if the file could not be read.
        src: String,
        #[source]
        err: StoreError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Writing offsets for a root failed. Roots committed before it are kept.
    #[error("Failed to write offsets for origin `{root}`: {source}")]
    RepositoryWrite {
        root: Id,
        #[source]
        source: RepositoryError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl FibermapError {
    pub(crate) fn new_load_error(path: impl Into<PathBuf>, src: String, err: StoreError) -> Self {
        Self::Load {
            path: path.into(),
            src,
            err,
        }
    }

    pub(crate) fn write_failure(root: Id, source: RepositoryError) -> Self {
        Self::RepositoryWrite { root, source }
    }
}
