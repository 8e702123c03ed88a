//! Unary operator execution

use crate::error::{Result, RuntimeError};
use sluice_core::ast::UnaryOperator;
use sluice_core::Value;

/// Execute a unary operation
pub fn execute_unary_op(operand: &Value, op: UnaryOperator) -> Result<Value> {
    match (op, operand) {
        (UnaryOperator::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOperator::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOperator::Negate, Value::Duration(d)) => Ok(Value::Duration(-*d)),
        (UnaryOperator::Negate, Value::Null) => Ok(Value::Null),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply {:?} to {}",
            op,
            operand.type_name()
        ))),
    }
}
