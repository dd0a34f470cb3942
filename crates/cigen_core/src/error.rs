//! Error types for composition, emission and the selection store.

use std::path::PathBuf;

use cigen_catalogue::CatalogueError;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    #[error("No saved selection at {0:?}; run `cigen init` first")]
    SelectionNotFound(PathBuf),

    #[error("Refusing to overwrite existing file {0:?} (use --force)")]
    AlreadyExists(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
