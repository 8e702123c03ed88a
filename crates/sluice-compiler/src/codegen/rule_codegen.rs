//! Rule compiler
//!
//! Compiles a rule's condition and actions into a [`ClosureRule`].

use super::expression_codegen::ExpressionCompiler;
use super::{action, Action, Fragment};
use crate::error::Result;
use sluice_core::ast::{RuleAst, Statement};
use sluice_runtime::engine::operators::condition_result;
use sluice_runtime::{CompiledRule, EvaluationContext, FunctionRegistry};
use std::fmt;

/// A rule compiled to closures
pub struct ClosureRule {
    name: String,
    condition: Fragment,
    actions: Vec<Action>,
    folded_constants: usize,
}

impl ClosureRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sub-expressions computed at compile time
    pub fn folded_constants(&self) -> usize {
        self.folded_constants
    }

    pub(crate) fn with_folded_constants(mut self, folded: usize) -> Self {
        self.folded_constants = folded;
        self
    }
}

impl fmt::Debug for ClosureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureRule")
            .field("name", &self.name)
            .field("actions", &self.actions.len())
            .field("folded_constants", &self.folded_constants)
            .finish()
    }
}

impl CompiledRule for ClosureRule {
    fn when(&self, ctx: &mut EvaluationContext<'_>) -> sluice_runtime::Result<bool> {
        let value = (self.condition)(ctx)?;
        condition_result(&value)
    }

    fn then(&self, ctx: &mut EvaluationContext<'_>) -> sluice_runtime::Result<()> {
        for action in &self.actions {
            action(ctx)?;
        }
        Ok(())
    }
}

/// Rule compiler
pub struct RuleCompiler;

impl RuleCompiler {
    /// Compile a rule whose expressions have already been optimized
    pub fn compile(rule: &RuleAst, functions: &FunctionRegistry) -> Result<ClosureRule> {
        let expressions = ExpressionCompiler::new(functions);
        let condition = expressions.compile(&rule.when)?;
        let actions = rule
            .then
            .iter()
            .map(|statement| Self::compile_statement(&expressions, statement))
            .collect::<Result<Vec<_>>>()?;

        Ok(ClosureRule {
            name: rule.name.clone(),
            condition,
            actions,
            folded_constants: 0,
        })
    }

    fn compile_statement(
        expressions: &ExpressionCompiler<'_>,
        statement: &Statement,
    ) -> Result<Action> {
        match statement {
            Statement::Expression(expr) => {
                let value = expressions.compile(expr)?;
                Ok(action(move |ctx| value(ctx).map(|_| ())))
            }
            Statement::Let { name, value } => {
                let name = name.clone();
                let value = expressions.compile(value)?;
                Ok(action(move |ctx| {
                    let v = value(ctx)?;
                    ctx.define(name.clone(), v);
                    Ok(())
                }))
            }
        }
    }
}
