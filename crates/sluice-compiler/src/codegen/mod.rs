//! Code generation module
//!
//! Translates rule ASTs into closures. Each compiled rule owns its closures
//! outright; nothing is shared between rules.

pub mod expression_codegen;
pub mod rule_codegen;

pub use expression_codegen::ExpressionCompiler;
pub use rule_codegen::{ClosureRule, RuleCompiler};

use sluice_core::Value;
use sluice_runtime::EvaluationContext;

/// Compiled expression
pub type Fragment =
    Box<dyn Fn(&mut EvaluationContext<'_>) -> sluice_runtime::Result<Value> + Send + Sync>;

/// Compiled action statement
pub type Action = Box<dyn Fn(&mut EvaluationContext<'_>) -> sluice_runtime::Result<()> + Send + Sync>;

pub(crate) fn fragment<F>(f: F) -> Fragment
where
    F: Fn(&mut EvaluationContext<'_>) -> sluice_runtime::Result<Value> + Send + Sync + 'static,
{
    Box::new(f)
}

pub(crate) fn action<F>(f: F) -> Action
where
    F: Fn(&mut EvaluationContext<'_>) -> sluice_runtime::Result<()> + Send + Sync + 'static,
{
    Box::new(f)
}
