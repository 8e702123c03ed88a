//! Runtime error types

use thiserror::Error;

/// Errors raised while evaluating rule conditions and actions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Operand of the wrong type
    #[error("Type error: {0}")]
    TypeError(String),

    /// Operator not defined for its operands
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Function name not present in the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Function called with an unsupported number of arguments
    #[error("Function '{function}' expects {expected} arguments, got {actual}")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Variable read before a `let` bound it
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    /// A rule condition produced something other than a boolean
    #[error("Condition must evaluate to a boolean, got {0}")]
    NonBooleanCondition(&'static str),

    /// A function rejected its arguments
    #[error("Function '{function}' failed: {message}")]
    FunctionError { function: String, message: String },
}

impl RuntimeError {
    pub fn function(function: &str, message: impl Into<String>) -> Self {
        RuntimeError::FunctionError {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
