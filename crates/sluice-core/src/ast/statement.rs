//! Statement AST nodes (the `then` part of a rule)

use super::expression::Expression;
use std::fmt;

/// A single action inside a rule's `then` block
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Evaluate an expression for its side effects, typically a function call
    Expression(Expression),

    /// Bind the value of an expression to a variable for later statements
    Let { name: String, value: Expression },
}

impl Statement {
    pub fn expression(expr: Expression) -> Self {
        Statement::Expression(expr)
    }

    pub fn assign(name: impl Into<String>, value: Expression) -> Self {
        Statement::Let {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Expression(expr) => write!(f, "{}", expr),
            Statement::Let { name, value } => write!(f, "let {} = {}", name, value),
        }
    }
}
