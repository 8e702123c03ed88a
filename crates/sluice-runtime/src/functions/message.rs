//! Functions that read or change the message being processed

use super::{string_arg, BuiltinFunction};
use crate::context::EvaluationContext;
use crate::error::{Result, RuntimeError};
use sluice_core::{Message, Value};

pub(super) fn builtins() -> Vec<BuiltinFunction> {
    vec![
        BuiltinFunction::new("has_field", 1..=1, false, has_field),
        BuiltinFunction::new("set_field", 2..=2, false, set_field),
        BuiltinFunction::new("set_fields", 1..=1, false, set_fields),
        BuiltinFunction::new("remove_field", 1..=1, false, remove_field),
        BuiltinFunction::new("route_to_stream", 1..=1, false, route_to_stream),
        BuiltinFunction::new("remove_from_stream", 1..=1, false, remove_from_stream),
        BuiltinFunction::new("drop_message", 0..=0, false, drop_message),
        BuiltinFunction::new("create_message", 0..=1, false, create_message),
        BuiltinFunction::new("clone_message", 0..=0, false, clone_message),
    ]
}

fn has_field(args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let name = string_arg("has_field", args, 0)?;
    Ok(Value::Bool(ctx.message().has_field(name)))
}

fn set_field(args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let name = string_arg("set_field", args, 0)?;
    let value = args.get(1).cloned().unwrap_or_default();
    ctx.message_mut()
        .try_set_field(name, value)
        .map_err(|e| RuntimeError::function("set_field", e.to_string()))?;
    Ok(Value::Null)
}

fn set_fields(args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    match args.first().unwrap_or(&Value::Null) {
        Value::Object(fields) => {
            for (name, value) in fields {
                ctx.message_mut()
                    .try_set_field(name.clone(), value.clone())
                    .map_err(|e| RuntimeError::function("set_fields", e.to_string()))?;
            }
            Ok(Value::Null)
        }
        other => Err(RuntimeError::function(
            "set_fields",
            format!("argument 1 must be an object, got {}", other.type_name()),
        )),
    }
}

fn remove_field(args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let name = string_arg("remove_field", args, 0)?;
    ctx.message_mut().remove_field(name);
    Ok(Value::Null)
}

fn route_to_stream(args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let stream_id = string_arg("route_to_stream", args, 0)?;
    ctx.message_mut()
        .try_add_stream(stream_id)
        .map_err(|e| RuntimeError::function("route_to_stream", e.to_string()))?;
    Ok(Value::Null)
}

fn remove_from_stream(args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let stream_id = string_arg("remove_from_stream", args, 0)?;
    ctx.message_mut().remove_stream(stream_id);
    Ok(Value::Null)
}

fn drop_message(_args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    ctx.message_mut().set_filter_out(true);
    Ok(Value::Null)
}

fn create_message(args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let mut message = Message::new();
    match args.first() {
        None | Some(Value::Null) => {}
        Some(Value::Object(fields)) => {
            for (name, value) in fields {
                message.set_field(name.clone(), value.clone());
            }
        }
        Some(other) => {
            return Err(RuntimeError::function(
                "create_message",
                format!("argument 1 must be an object, got {}", other.type_name()),
            ))
        }
    }
    ctx.add_created_message(message);
    Ok(Value::Null)
}

/// Copy fields and streams of the current message under a fresh id
fn clone_message(_args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
    let source = ctx.message();
    let mut clone = Message::new();
    for (name, value) in source.fields() {
        clone.set_field(name.clone(), value.clone());
    }
    for stream in source.streams() {
        clone.add_stream(stream.clone());
    }
    ctx.add_created_message(clone);
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::super::FunctionRegistry;
    use super::*;
    use std::collections::BTreeMap;

    fn call(msg: &mut Message, name: &str, args: &[Value]) -> (Result<Value>, Vec<Message>) {
        let registry = FunctionRegistry::with_builtins();
        let mut ctx = EvaluationContext::new(msg);
        let result = registry
            .resolve(name, args.len())
            .and_then(|f| f.evaluate(args, &mut ctx));
        let created = ctx.take_created_messages();
        (result, created)
    }

    #[test]
    fn test_field_functions() {
        let mut msg = Message::with_id("m1").with_field("a", "x");

        let (r, _) = call(&mut msg, "has_field", &[Value::from("a")]);
        assert_eq!(r.unwrap(), Value::Bool(true));

        call(&mut msg, "set_field", &[Value::from("b"), Value::from(2.0)]).0.unwrap();
        assert_eq!(msg.field("b"), Some(&Value::Number(2.0)));

        call(&mut msg, "remove_field", &[Value::from("a")]).0.unwrap();
        assert!(!msg.has_field("a"));
    }

    #[test]
    fn test_set_fields_requires_object() {
        let mut msg = Message::with_id("m1");
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), Value::from(1.0));
        call(&mut msg, "set_fields", &[Value::Object(fields)]).0.unwrap();
        assert!(msg.has_field("x"));

        let (r, _) = call(&mut msg, "set_fields", &[Value::from("nope")]);
        assert!(matches!(r, Err(RuntimeError::FunctionError { .. })));
    }

    #[test]
    fn test_stream_routing() {
        let mut msg = Message::with_id("m1").with_stream("s1");
        call(&mut msg, "route_to_stream", &[Value::from("s2")]).0.unwrap();
        call(&mut msg, "remove_from_stream", &[Value::from("s1")]).0.unwrap();
        assert_eq!(msg.streams().iter().collect::<Vec<_>>(), vec!["s2"]);
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let mut msg = Message::with_id("m1");
        let (r, _) = call(&mut msg, "set_field", &[Value::from(" "), Value::from(1.0)]);
        assert!(matches!(r, Err(RuntimeError::FunctionError { .. })));

        let (r, _) = call(&mut msg, "route_to_stream", &[Value::from("")]);
        assert!(r.is_err());
        assert!(msg.fields().is_empty());
        assert!(msg.streams().is_empty());
    }

    #[test]
    fn test_drop_message() {
        let mut msg = Message::with_id("m1");
        call(&mut msg, "drop_message", &[]).0.unwrap();
        assert!(msg.filter_out());
    }

    #[test]
    fn test_created_messages_get_fresh_ids() {
        let mut msg = Message::with_id("m1").with_field("a", "x").with_stream("s1");

        let (_, created) = call(&mut msg, "clone_message", &[]);
        assert_eq!(created.len(), 1);
        assert_ne!(created[0].id(), "m1");
        assert_eq!(created[0].field("a"), Some(&Value::from("x")));
        assert!(created[0].streams().contains("s1"));

        let (_, created) = call(&mut msg, "create_message", &[]);
        assert_eq!(created.len(), 1);
        assert!(created[0].fields().is_empty());
    }
}
