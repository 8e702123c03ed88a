//! Sluice Compiler - Rule AST to closure compiler
//!
//! This crate compiles parsed rules into closures that the interpreter can
//! call in place of walking the AST. Compiled and interpreted rules behave
//! identically; both go through the runtime's operator module.

pub mod codegen;
pub mod compiler;
pub mod error;
pub mod optimizer;

// Re-export main types
pub use codegen::{ClosureRule, ExpressionCompiler, RuleCompiler};
pub use compiler::{Compiler, CompilerOptions};
pub use error::{CompileError, Result};
pub use optimizer::ConstantFolder;
