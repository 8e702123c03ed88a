//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Invalid expression syntax
    #[error("Invalid expression syntax at offset {offset}: {message}")]
    InvalidExpression { offset: usize, message: String },

    /// Input ended in the middle of an expression
    #[error("Unexpected end of expression: {0}")]
    UnexpectedEnd(String),

    /// Two stages of one pipeline share a number
    #[error("Duplicate stage number {0}")]
    DuplicateStage(i32),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
