//! Rule functions
//!
//! Every function callable from a rule implements [`Function`] and is looked
//! up by name in a [`FunctionRegistry`]. The interpreter resolves a call on
//! every evaluation; compiled rules resolve it once, when the rule is
//! compiled.

mod conversion;
mod dates;
mod message;
mod strings;

use crate::context::EvaluationContext;
use crate::error::{Result, RuntimeError};
use sluice_core::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// A function that rules can call
pub trait Function: Send + Sync {
    /// Name used in rule source
    fn name(&self) -> &str;

    /// Accepted argument counts
    fn arity(&self) -> RangeInclusive<usize>;

    /// True when the result depends only on the arguments. Pure calls with
    /// constant arguments may be evaluated once when a rule is compiled.
    fn is_pure(&self) -> bool {
        false
    }

    fn evaluate(&self, args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value>;
}

type BuiltinFn = fn(&[Value], &mut EvaluationContext<'_>) -> Result<Value>;

/// A function backed by a plain `fn` pointer
pub struct BuiltinFunction {
    name: &'static str,
    arity: RangeInclusive<usize>,
    pure: bool,
    body: BuiltinFn,
}

impl BuiltinFunction {
    pub fn new(
        name: &'static str,
        arity: RangeInclusive<usize>,
        pure: bool,
        body: BuiltinFn,
    ) -> Self {
        Self {
            name,
            arity,
            pure,
            body,
        }
    }
}

impl Function for BuiltinFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> RangeInclusive<usize> {
        self.arity.clone()
    }

    fn is_pure(&self) -> bool {
        self.pure
    }

    fn evaluate(&self, args: &[Value], ctx: &mut EvaluationContext<'_>) -> Result<Value> {
        (self.body)(args, ctx)
    }
}

/// Name-indexed set of functions available to rules
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in function
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in message::builtins()
            .into_iter()
            .chain(conversion::builtins())
            .chain(strings::builtins())
            .chain(dates::builtins())
        {
            registry.register(Arc::new(builtin));
        }
        registry
    }

    /// Add a function, replacing any existing one with the same name
    pub fn register(&mut self, function: Arc<dyn Function>) {
        self.functions.insert(function.name().to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Look up a function and check that it accepts `arg_count` arguments
    pub fn resolve(&self, name: &str, arg_count: usize) -> Result<Arc<dyn Function>> {
        let function = self
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))?;

        let arity = function.arity();
        if !arity.contains(&arg_count) {
            let expected = if arity.start() == arity.end() {
                arity.start().to_string()
            } else if *arity.end() == usize::MAX {
                format!("at least {}", arity.start())
            } else {
                format!("{} to {}", arity.start(), arity.end())
            };
            return Err(RuntimeError::ArityMismatch {
                function: name.to_string(),
                expected,
                actual: arg_count,
            });
        }

        Ok(function)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

// Argument helpers shared by the built-ins

fn string_arg<'v>(function: &str, args: &'v [Value], index: usize) -> Result<&'v str> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(RuntimeError::function(
            function,
            format!("argument {} must be a string, got {}", index + 1, other.type_name()),
        )),
        None => Err(RuntimeError::function(
            function,
            format!("missing argument {}", index + 1),
        )),
    }
}

fn number_arg(function: &str, args: &[Value], index: usize) -> Result<f64> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(RuntimeError::function(
            function,
            format!("argument {} must be a number, got {}", index + 1, other.type_name()),
        )),
        None => Err(RuntimeError::function(
            function,
            format!("missing argument {}", index + 1),
        )),
    }
}

fn optional_bool_arg(function: &str, args: &[Value], index: usize) -> Result<bool> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(RuntimeError::function(
            function,
            format!("argument {} must be a bool, got {}", index + 1, other.type_name()),
        )),
    }
}
