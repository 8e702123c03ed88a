//! Tree-walking evaluator
//!
//! Interprets rule conditions and actions directly from the AST.

use super::operators::{
    condition_result, execute_binary_op, execute_unary_op, expect_bool,
};
use crate::context::EvaluationContext;
use crate::error::{Result, RuntimeError};
use crate::functions::FunctionRegistry;
use sluice_core::ast::{Expression, Operator, Statement};
use sluice_core::Value;

/// Evaluates AST nodes against an [`EvaluationContext`]
pub struct Evaluator<'f> {
    functions: &'f FunctionRegistry,
}

impl<'f> Evaluator<'f> {
    pub fn new(functions: &'f FunctionRegistry) -> Self {
        Self { functions }
    }

    /// Evaluate a rule condition; anything but a boolean is an error
    pub fn evaluate_condition(
        &self,
        expr: &Expression,
        ctx: &mut EvaluationContext<'_>,
    ) -> Result<bool> {
        let value = self.evaluate(expr, ctx)?;
        condition_result(&value)
    }

    /// Run a rule's actions in order, stopping at the first error
    pub fn execute(&self, statements: &[Statement], ctx: &mut EvaluationContext<'_>) -> Result<()> {
        for statement in statements {
            match statement {
                Statement::Expression(expr) => {
                    self.evaluate(expr, ctx)?;
                }
                Statement::Let { name, value } => {
                    let value = self.evaluate(value, ctx)?;
                    ctx.define(name.clone(), value);
                }
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, expr: &Expression, ctx: &mut EvaluationContext<'_>) -> Result<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::MessageField(name) => {
                Ok(ctx.message().field(name).cloned().unwrap_or(Value::Null))
            }

            Expression::Variable(name) => ctx
                .variable(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),

            Expression::Array(items) => items
                .iter()
                .map(|item| self.evaluate(item, ctx))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),

            Expression::Binary { left, op, right } if op.is_logical() => {
                let l = expect_bool(&self.evaluate(left, ctx)?, *op)?;
                // short-circuit
                match (op, l) {
                    (Operator::And, false) => Ok(Value::Bool(false)),
                    (Operator::Or, true) => Ok(Value::Bool(true)),
                    _ => {
                        let r = expect_bool(&self.evaluate(right, ctx)?, *op)?;
                        Ok(Value::Bool(r))
                    }
                }
            }

            Expression::Binary { left, op, right } => {
                let l = self.evaluate(left, ctx)?;
                let r = self.evaluate(right, ctx)?;
                execute_binary_op(&l, *op, &r)
            }

            Expression::Unary { op, operand } => {
                let value = self.evaluate(operand, ctx)?;
                execute_unary_op(&value, *op)
            }

            Expression::FunctionCall { name, args } => {
                let function = self.functions.resolve(name, args.len())?;
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg, ctx))
                    .collect::<Result<Vec<_>>>()?;
                function.evaluate(&values, ctx)
            }
        }
    }
}
