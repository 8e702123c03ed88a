//! Constant folding optimizer
//!
//! Evaluates sub-expressions that do not depend on the message at compile
//! time, so compiled rules compute them once instead of per message.

use sluice_core::ast::{Expression, Operator};
use sluice_core::{Message, Value};
use sluice_runtime::engine::operators::{execute_binary_op, execute_unary_op, expect_bool};
use sluice_runtime::{EvaluationContext, FunctionRegistry};

/// Constant folding optimizer
pub struct ConstantFolder<'f> {
    functions: &'f FunctionRegistry,
    folded: usize,
}

impl<'f> ConstantFolder<'f> {
    pub fn new(functions: &'f FunctionRegistry) -> Self {
        Self {
            functions,
            folded: 0,
        }
    }

    /// Number of non-literal nodes replaced by literals so far
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Fold an expression. A sub-expression whose evaluation fails is kept
    /// as is so the error is raised when the rule runs.
    pub fn fold(&mut self, expr: &Expression) -> Expression {
        match expr {
            Expression::Literal(_) | Expression::MessageField(_) | Expression::Variable(_) => {
                expr.clone()
            }

            Expression::Array(items) => {
                let items: Vec<Expression> = items.iter().map(|item| self.fold(item)).collect();
                let values: Option<Vec<Value>> = items.iter().map(literal_value).collect();
                match values {
                    Some(values) => self.hoist(Value::Array(values)),
                    None => Expression::Array(items),
                }
            }

            Expression::Binary { left, op, right } => {
                let left = self.fold(left);

                // A constant left side may decide a logical operator alone
                if let (Some(Value::Bool(l)), true) = (literal_value(&left), op.is_logical()) {
                    match (op, l) {
                        (Operator::And, false) => return self.hoist(Value::Bool(false)),
                        (Operator::Or, true) => return self.hoist(Value::Bool(true)),
                        _ => {}
                    }
                }

                let right = self.fold(right);
                if let (Some(l), Some(r)) = (literal_value(&left), literal_value(&right)) {
                    if let Some(value) = fold_binary(&l, *op, &r) {
                        return self.hoist(value);
                    }
                }
                Expression::binary(left, *op, right)
            }

            Expression::Unary { op, operand } => {
                let operand = self.fold(operand);
                if let Some(value) = literal_value(&operand) {
                    if let Ok(result) = execute_unary_op(&value, *op) {
                        return self.hoist(result);
                    }
                }
                Expression::unary(*op, operand)
            }

            Expression::FunctionCall { name, args } => {
                let args: Vec<Expression> = args.iter().map(|arg| self.fold(arg)).collect();
                if let Some(value) = self.fold_call(name, &args) {
                    return self.hoist(value);
                }
                Expression::function_call(name.clone(), args)
            }
        }
    }

    /// Call a pure function whose arguments are all literals
    fn fold_call(&self, name: &str, args: &[Expression]) -> Option<Value> {
        let function = self.functions.resolve(name, args.len()).ok()?;
        if !function.is_pure() {
            return None;
        }
        let values: Vec<Value> = args.iter().map(literal_value).collect::<Option<_>>()?;

        // Pure functions never look at the message
        let mut scratch = Message::with_id("constant");
        let mut ctx = EvaluationContext::new(&mut scratch);
        function.evaluate(&values, &mut ctx).ok()
    }

    fn hoist(&mut self, value: Value) -> Expression {
        self.folded += 1;
        Expression::Literal(value)
    }
}

fn literal_value(expr: &Expression) -> Option<Value> {
    match expr {
        Expression::Literal(value) => Some(value.clone()),
        _ => None,
    }
}

fn fold_binary(left: &Value, op: Operator, right: &Value) -> Option<Value> {
    if op.is_logical() {
        let l = expect_bool(left, op).ok()?;
        let r = expect_bool(right, op).ok()?;
        return Some(Value::Bool(match op {
            Operator::And => l && r,
            _ => l || r,
        }));
    }
    execute_binary_op(left, op, right).ok()
}
