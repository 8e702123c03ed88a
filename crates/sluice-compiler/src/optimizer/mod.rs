//! Optimization module
//!
//! Rewrites applied to a rule's AST before code generation.

pub mod constant_folding;

pub use constant_folding::ConstantFolder;
