//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(#[from] sluice_repository::RepositoryError),

    /// Parser error
    #[error("Parser error: {0}")]
    Parse(#[from] sluice_parser::ParseError),

    /// Compiler error
    #[error("Compiler error: {0}")]
    Compile(#[from] sluice_compiler::CompileError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A processor was built without a source of definitions
    #[error("No repository configured")]
    MissingRepository,
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
