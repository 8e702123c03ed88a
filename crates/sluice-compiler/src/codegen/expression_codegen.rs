//! Expression compiler
//!
//! Turns an expression tree into a tree of closures. Function calls are
//! bound to their implementation here, once, instead of on every
//! evaluation.

use super::{fragment, Fragment};
use crate::error::Result;
use sluice_core::ast::{Expression, Operator};
use sluice_core::Value;
use sluice_runtime::engine::operators::{execute_binary_op, execute_unary_op, expect_bool};
use sluice_runtime::{FunctionRegistry, RuntimeError};

/// Expression compiler
pub struct ExpressionCompiler<'f> {
    functions: &'f FunctionRegistry,
}

impl<'f> ExpressionCompiler<'f> {
    pub fn new(functions: &'f FunctionRegistry) -> Self {
        Self { functions }
    }

    /// Compile an expression into a closure evaluating it
    pub fn compile(&self, expr: &Expression) -> Result<Fragment> {
        match expr {
            Expression::Literal(value) => {
                let value = value.clone();
                Ok(fragment(move |_ctx| Ok(value.clone())))
            }

            Expression::MessageField(name) => {
                let name = name.clone();
                Ok(fragment(move |ctx| {
                    Ok(ctx.message().field(&name).cloned().unwrap_or(Value::Null))
                }))
            }

            Expression::Variable(name) => {
                let name = name.clone();
                Ok(fragment(move |ctx| {
                    ctx.variable(&name)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))
                }))
            }

            Expression::Array(items) => {
                let items = self.compile_all(items)?;
                Ok(fragment(move |ctx| {
                    items
                        .iter()
                        .map(|item| item(ctx))
                        .collect::<sluice_runtime::Result<Vec<_>>>()
                        .map(Value::Array)
                }))
            }

            Expression::Binary { left, op, right } => {
                let op = *op;
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                if op.is_logical() {
                    Ok(Self::logical(left, op, right))
                } else {
                    Ok(fragment(move |ctx| {
                        let l = left(ctx)?;
                        let r = right(ctx)?;
                        execute_binary_op(&l, op, &r)
                    }))
                }
            }

            Expression::Unary { op, operand } => {
                let op = *op;
                let operand = self.compile(operand)?;
                Ok(fragment(move |ctx| execute_unary_op(&operand(ctx)?, op)))
            }

            Expression::FunctionCall { name, args } => {
                let function = self.functions.resolve(name, args.len())?;
                let args = self.compile_all(args)?;
                Ok(fragment(move |ctx| {
                    let values = args
                        .iter()
                        .map(|arg| arg(ctx))
                        .collect::<sluice_runtime::Result<Vec<_>>>()?;
                    function.evaluate(&values, ctx)
                }))
            }
        }
    }

    fn compile_all(&self, exprs: &[Expression]) -> Result<Vec<Fragment>> {
        exprs.iter().map(|expr| self.compile(expr)).collect()
    }

    fn logical(left: Fragment, op: Operator, right: Fragment) -> Fragment {
        match op {
            Operator::And => fragment(move |ctx| {
                if !expect_bool(&left(ctx)?, op)? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(expect_bool(&right(ctx)?, op)?))
            }),
            _ => fragment(move |ctx| {
                if expect_bool(&left(ctx)?, op)? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(expect_bool(&right(ctx)?, op)?))
            }),
        }
    }
}
