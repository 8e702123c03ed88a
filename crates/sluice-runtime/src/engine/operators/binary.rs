//! Binary operator execution

use super::comparison::{execute_compare, execute_equality};
use crate::error::{Result, RuntimeError};
use sluice_core::ast::Operator;
use sluice_core::Value;

/// Execute a binary operation on two already evaluated operands.
///
/// `&&` and `||` are accepted here for completeness, but evaluators
/// short-circuit them before both operands exist.
pub fn execute_binary_op(left: &Value, op: Operator, right: &Value) -> Result<Value> {
    if op.is_equality() {
        return execute_equality(left, op, right).map(Value::Bool);
    }
    if op.is_comparison() {
        return execute_compare(left, op, right).map(Value::Bool);
    }
    if op.is_logical() {
        let l = expect_bool(left, op)?;
        let r = expect_bool(right, op)?;
        return Ok(Value::Bool(if op == Operator::And { l && r } else { l || r }));
    }

    // Null in arithmetic propagates, so expressions over missing fields
    // yield null instead of failing
    if left.is_null() || right.is_null() {
        tracing::debug!("Null in binary operation: {} {} {}, returning Null", left, op, right);
        return Ok(Value::Null);
    }

    match (left, op, right) {
        (Value::Number(l), Operator::Add, Value::Number(r)) => Ok(Value::Number(l + r)),
        (Value::Number(l), Operator::Sub, Value::Number(r)) => Ok(Value::Number(l - r)),
        (Value::Number(l), Operator::Mul, Value::Number(r)) => Ok(Value::Number(l * r)),
        (Value::Number(l), Operator::Div, Value::Number(r)) => {
            if *r == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Number(l / r))
            }
        }
        (Value::Number(l), Operator::Mod, Value::Number(r)) => {
            if *r == 0.0 {
                Err(RuntimeError::DivisionByZero)
            } else {
                Ok(Value::Number(l % r))
            }
        }

        (Value::String(l), Operator::Add, Value::String(r)) => {
            Ok(Value::String(format!("{}{}", l, r)))
        }

        // Time arithmetic
        (Value::DateTime(l), Operator::Sub, Value::DateTime(r)) => {
            Ok(Value::Duration(l.signed_duration_since(*r)))
        }
        (Value::Duration(l), Operator::Add, Value::Duration(r)) => l
            .checked_add(r)
            .map(Value::Duration)
            .ok_or_else(|| overflow(left, op, right)),
        (Value::Duration(l), Operator::Sub, Value::Duration(r)) => l
            .checked_sub(r)
            .map(Value::Duration)
            .ok_or_else(|| overflow(left, op, right)),
        (Value::DateTime(l), Operator::Add, Value::Duration(r))
        | (Value::Duration(r), Operator::Add, Value::DateTime(l)) => l
            .checked_add_signed(*r)
            .map(Value::DateTime)
            .ok_or_else(|| overflow(left, op, right)),
        (Value::DateTime(l), Operator::Sub, Value::Duration(r)) => l
            .checked_sub_signed(*r)
            .map(Value::DateTime)
            .ok_or_else(|| overflow(left, op, right)),

        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply {} to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Require a boolean operand for a logical operator
pub fn expect_bool(value: &Value, op: Operator) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        RuntimeError::TypeError(format!(
            "operand of {} must be a bool, got {}",
            op,
            value.type_name()
        ))
    })
}

fn overflow(left: &Value, op: Operator, right: &Value) -> RuntimeError {
    RuntimeError::InvalidOperation(format!("{} {} {} overflows", left, op, right))
}
