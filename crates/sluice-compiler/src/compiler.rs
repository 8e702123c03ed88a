//! Main compiler
//!
//! Runs the optimizer over a rule and generates its closures.

use crate::codegen::{ClosureRule, RuleCompiler};
use crate::error::Result;
use crate::optimizer::ConstantFolder;
use sluice_core::ast::{RuleAst, Statement};
use sluice_runtime::FunctionRegistry;
use std::sync::Arc;
use tracing::debug;

/// Compiler options
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Evaluate message-independent sub-expressions at compile time
    pub enable_constant_folding: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            enable_constant_folding: true,
        }
    }
}

/// Compiles rules against one function registry
pub struct Compiler {
    options: CompilerOptions,
    functions: Arc<FunctionRegistry>,
}

impl Compiler {
    /// Create a compiler with default options
    pub fn new(functions: Arc<FunctionRegistry>) -> Self {
        Self::with_options(functions, CompilerOptions::default())
    }

    pub fn with_options(functions: Arc<FunctionRegistry>, options: CompilerOptions) -> Self {
        Self { options, functions }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a rule. Fails if any function call cannot be bound.
    pub fn compile_rule(&self, rule: &RuleAst) -> Result<ClosureRule> {
        let (optimized, folded) = if self.options.enable_constant_folding {
            self.fold_rule(rule)
        } else {
            (rule.clone(), 0)
        };

        let compiled = RuleCompiler::compile(&optimized, &self.functions)?
            .with_folded_constants(folded);

        debug!(
            "compiled rule `{}` ({} actions, {} constants folded)",
            rule.name,
            rule.then.len(),
            folded
        );
        Ok(compiled)
    }

    fn fold_rule(&self, rule: &RuleAst) -> (RuleAst, usize) {
        let mut folder = ConstantFolder::new(&self.functions);
        let when = folder.fold(&rule.when);
        let then = rule
            .then
            .iter()
            .map(|statement| match statement {
                Statement::Expression(expr) => Statement::Expression(folder.fold(expr)),
                Statement::Let { name, value } => Statement::Let {
                    name: name.clone(),
                    value: folder.fold(value),
                },
            })
            .collect();

        let mut optimized = RuleAst::new(rule.name.clone(), when, then);
        optimized.id = rule.id.clone();
        (optimized, folder.folded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::ast::{Expression, Operator};

    fn rule() -> RuleAst {
        RuleAst::new(
            "threshold",
            Expression::binary(
                Expression::message_field("took_ms"),
                Operator::Gt,
                Expression::binary(Expression::literal(2.0), Operator::Mul, Expression::literal(1000.0)),
            ),
            vec![],
        )
    }

    #[test]
    fn test_constant_folding_is_counted() {
        let compiler = Compiler::new(Arc::new(FunctionRegistry::with_builtins()));
        let compiled = compiler.compile_rule(&rule()).unwrap();
        assert_eq!(compiled.folded_constants(), 1);
        assert_eq!(compiled.name(), "threshold");
    }

    #[test]
    fn test_constant_folding_can_be_disabled() {
        let compiler = Compiler::with_options(
            Arc::new(FunctionRegistry::with_builtins()),
            CompilerOptions {
                enable_constant_folding: false,
            },
        );
        let compiled = compiler.compile_rule(&rule()).unwrap();
        assert_eq!(compiled.folded_constants(), 0);
    }
}
