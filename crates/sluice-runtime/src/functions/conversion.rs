//! Type conversion functions

use super::BuiltinFunction;
use crate::context::EvaluationContext;
use crate::error::Result;
use sluice_core::Value;

pub(super) fn builtins() -> Vec<BuiltinFunction> {
    vec![
        BuiltinFunction::new("to_string", 1..=2, true, to_string),
        BuiltinFunction::new("to_number", 1..=2, true, to_number),
        BuiltinFunction::new("to_bool", 1..=1, true, to_bool),
    ]
}

/// `to_string(value, default = "")`; null converts to the default
fn to_string(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    match args.first() {
        None | Some(Value::Null) => Ok(args
            .get(1)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))),
        Some(Value::String(s)) => Ok(Value::String(s.clone())),
        Some(other) => Ok(Value::String(other.to_string())),
    }
}

/// `to_number(value, default = 0)`; unconvertible values give the default
fn to_number(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let converted = match args.first() {
        Some(Value::Number(n)) => Some(*n),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match converted {
        Some(n) => Value::Number(n),
        None => args.get(1).cloned().unwrap_or(Value::Number(0.0)),
    })
}

fn to_bool(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let b = match args.first() {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => *n != 0.0,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    };
    Ok(Value::Bool(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::Message;

    fn eval(f: fn(&[Value], &mut EvaluationContext<'_>) -> Result<Value>, args: &[Value]) -> Value {
        let mut msg = Message::with_id("m1");
        let mut ctx = EvaluationContext::new(&mut msg);
        f(args, &mut ctx).unwrap()
    }

    #[test]
    fn test_to_string() {
        assert_eq!(eval(to_string, &[Value::from(42.0)]), Value::from("42"));
        assert_eq!(eval(to_string, &[Value::Null]), Value::from(""));
        assert_eq!(
            eval(to_string, &[Value::Null, Value::from("n/a")]),
            Value::from("n/a")
        );
    }

    #[test]
    fn test_to_number() {
        assert_eq!(eval(to_number, &[Value::from(" 12.5 ")]), Value::Number(12.5));
        assert_eq!(eval(to_number, &[Value::from(true)]), Value::Number(1.0));
        assert_eq!(eval(to_number, &[Value::from("abc")]), Value::Number(0.0));
        assert_eq!(
            eval(to_number, &[Value::from("abc"), Value::from(-1.0)]),
            Value::Number(-1.0)
        );
    }

    #[test]
    fn test_to_bool() {
        assert_eq!(eval(to_bool, &[Value::from("TRUE")]), Value::Bool(true));
        assert_eq!(eval(to_bool, &[Value::from("yes")]), Value::Bool(false));
        assert_eq!(eval(to_bool, &[Value::from(2.0)]), Value::Bool(true));
        assert_eq!(eval(to_bool, &[Value::Null]), Value::Bool(false));
    }
}
