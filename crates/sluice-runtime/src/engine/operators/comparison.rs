//! Equality and ordering operators

use crate::error::{Result, RuntimeError};
use sluice_core::ast::Operator;
use sluice_core::Value;
use std::cmp::Ordering;

/// Execute `==` / `!=`
///
/// Booleans and numbers compare natively, timestamps by instant and
/// durations by length. Everything else falls back to structural equality.
pub fn execute_equality(left: &Value, op: Operator, right: &Value) -> Result<bool> {
    let equal = match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::DateTime(l), Value::DateTime(r)) => l == r,
        (Value::Duration(l), Value::Duration(r)) => l == r,
        _ => left == right,
    };

    match op {
        Operator::Eq => Ok(equal),
        Operator::Ne => Ok(!equal),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "{} is not an equality operator",
            op
        ))),
    }
}

/// Execute `<`, `<=`, `>`, `>=`
pub fn execute_compare(left: &Value, op: Operator, right: &Value) -> Result<bool> {
    // Missing fields read as null; ordering against them is simply false
    if left.is_null() || right.is_null() {
        tracing::debug!("Null comparison: {} {} {}, returning false", left, op, right);
        return Ok(false);
    }

    let ordering = match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::DateTime(l), Value::DateTime(r)) => Some(l.cmp(r)),
        (Value::Duration(l), Value::Duration(r)) => Some(l.cmp(r)),
        _ => {
            return Err(RuntimeError::InvalidOperation(format!(
                "Cannot compare {} and {} with {}",
                left.type_name(),
                right.type_name(),
                op
            )))
        }
    };

    // NaN compares false against everything
    let Some(ordering) = ordering else {
        return Ok(false);
    };

    match op {
        Operator::Gt => Ok(ordering == Ordering::Greater),
        Operator::Ge => Ok(ordering != Ordering::Less),
        Operator::Lt => Ok(ordering == Ordering::Less),
        Operator::Le => Ok(ordering != Ordering::Greater),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "{} is not an ordering operator",
            op
        ))),
    }
}
