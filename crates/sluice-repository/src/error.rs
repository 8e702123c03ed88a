//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised while reading or writing stored definitions
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `connections.yaml` is not valid YAML, or a file could not be encoded
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Repository root does not exist, or an id cannot name a file
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Delete of a rule or pipeline id that is not stored
    #[error("Definition not found: {id}")]
    IdNotFound { id: String },

    #[error("Repository error: {0}")]
    Other(String),
}
