//! String functions

use super::{optional_bool_arg, string_arg, BuiltinFunction};
use crate::context::EvaluationContext;
use crate::error::{Result, RuntimeError};
use sluice_core::Value;

pub(super) fn builtins() -> Vec<BuiltinFunction> {
    vec![
        BuiltinFunction::new("lowercase", 1..=1, true, lowercase),
        BuiltinFunction::new("uppercase", 1..=1, true, uppercase),
        BuiltinFunction::new("concat", 1..=usize::MAX, true, concat),
        BuiltinFunction::new("contains", 2..=3, true, contains),
        BuiltinFunction::new("starts_with", 2..=3, true, starts_with),
    ]
}

fn lowercase(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    Ok(Value::String(string_arg("lowercase", args, 0)?.to_lowercase()))
}

fn uppercase(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    Ok(Value::String(string_arg("uppercase", args, 0)?.to_uppercase()))
}

/// Join the display form of every argument; nulls contribute nothing
fn concat(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let mut out = String::new();
    for arg in args.iter().filter(|a| !a.is_null()) {
        out.push_str(&arg.to_string());
    }
    Ok(Value::String(out))
}

/// `contains(haystack, needle, ignore_case = false)`; the haystack may be
/// a string or an array
fn contains(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let ignore_case = optional_bool_arg("contains", args, 2)?;
    match args.first() {
        Some(Value::Array(items)) => {
            let needle = args.get(1).unwrap_or(&Value::Null);
            let found = items.iter().any(|item| match (item, needle) {
                (Value::String(a), Value::String(b)) if ignore_case => a.eq_ignore_ascii_case(b),
                _ => item == needle,
            });
            Ok(Value::Bool(found))
        }
        Some(Value::String(haystack)) => {
            let needle = string_arg("contains", args, 1)?;
            let found = if ignore_case {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            } else {
                haystack.contains(needle)
            };
            Ok(Value::Bool(found))
        }
        Some(Value::Null) | None => Ok(Value::Bool(false)),
        Some(other) => Err(RuntimeError::function(
            "contains",
            format!("cannot search in {}", other.type_name()),
        )),
    }
}

fn starts_with(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    if matches!(args.first(), Some(Value::Null) | None) {
        return Ok(Value::Bool(false));
    }
    let value = string_arg("starts_with", args, 0)?;
    let prefix = string_arg("starts_with", args, 1)?;
    let found = if optional_bool_arg("starts_with", args, 2)? {
        value.to_lowercase().starts_with(&prefix.to_lowercase())
    } else {
        value.starts_with(prefix)
    };
    Ok(Value::Bool(found))
}
