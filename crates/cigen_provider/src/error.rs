//! Error types for provider documents.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while building or reading a provider document.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No {0} selected")]
    NotSelected(String),

    #[error("{fragment} does not define setting '{key}'")]
    MissingSetting { fragment: String, key: String },

    #[error("Invalid app name '{0}': use lowercase letters, digits and '-', starting with a letter (max 63)")]
    InvalidAppName(String),

    #[error("Invalid provider document: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
