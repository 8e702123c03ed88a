//! Rule evaluation engine
//!
//! Operator semantics and the tree-walking evaluator used by interpreted
//! rules.

pub mod evaluator;
pub mod operators;

pub use evaluator::Evaluator;
