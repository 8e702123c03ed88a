//! Compiler error types

use sluice_runtime::RuntimeError;
use thiserror::Error;

/// Compiler error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A function call that cannot be bound
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// A function called with an argument count it does not accept
    #[error("Function '{function}' expects {expected} arguments, got {actual}")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Generic compilation error
    #[error("Compilation error: {0}")]
    CompileError(String),
}

impl From<RuntimeError> for CompileError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::UnknownFunction(name) => CompileError::UnknownFunction(name),
            RuntimeError::ArityMismatch {
                function,
                expected,
                actual,
            } => CompileError::ArityMismatch {
                function,
                expected,
                actual,
            },
            other => CompileError::CompileError(other.to_string()),
        }
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
