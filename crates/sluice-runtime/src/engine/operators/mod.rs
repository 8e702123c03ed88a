//! Operator execution modules
//!
//! Operator semantics shared by the tree-walking evaluator and compiled
//! rules. Both execution strategies must call into this module so a rule
//! behaves the same however it runs.

mod binary;
mod comparison;
mod unary;

pub use binary::{execute_binary_op, expect_bool};
pub use comparison::{execute_compare, execute_equality};
pub use unary::execute_unary_op;

use crate::error::{Result, RuntimeError};
use sluice_core::Value;

/// Interpret the value of a rule condition
pub fn condition_result(value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or(RuntimeError::NonBooleanCondition(value.type_name()))
}
