//! Error types for the fragment catalogue.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for catalogue operations.
pub type CatalogueResult<T> = Result<T, CatalogueError>;

/// Errors that can occur while building or loading a catalogue.
///
/// None of these are recoverable by changing the selection; they abort
/// generation.
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Catalogue integrity check failed: {}", .issues.join("; "))]
    Integrity { issues: Vec<String> },

    #[error("Invalid fragment file {path:?}: {message}")]
    InvalidFragment { path: PathBuf, message: String },

    #[error("Catalogue directory not found: {0:?}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
