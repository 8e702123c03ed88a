//! sluice core - shared types for the sluice pipeline processor
//!
//! This crate provides the fundamental types used across the sluice workspace:
//! - Value types for runtime data
//! - Messages flowing through pipelines
//! - AST (Abstract Syntax Tree) definitions for rules and pipelines
//! - Error types

pub mod ast;
pub mod error;
pub mod message;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use message::Message;
pub use types::Value;
