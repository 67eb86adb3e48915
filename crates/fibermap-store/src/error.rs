//! Error types for loading network documents.

use std::{io, path::PathBuf};

use thiserror::Error;

use fibermap_core::identifier::Id;

/// Errors raised while loading or validating a network document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse network document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize network document: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("duplicate {kind} code `{code}`")]
    DuplicateCode { kind: &'static str, code: Id },
}
