//! Error types for sluice core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Field names must contain a non-whitespace character
    #[error("Invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// Stream ids must contain a non-whitespace character
    #[error("Invalid stream id: {0:?}")]
    InvalidStreamId(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
