//! Expression AST nodes

use super::operator::Operator;
use crate::types::Value;
use std::fmt;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Value),

    /// Field of the message being processed (`$message.source`)
    MessageField(String),

    /// Variable bound by an earlier `let` statement
    Variable(String),

    /// Array literal whose elements are expressions
    Array(Vec<Expression>),

    /// Binary operation
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// Function call with positional arguments
    FunctionCall { name: String, args: Vec<Expression> },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Logical NOT (!)
    Not,
    /// Arithmetic negation (-)
    Negate,
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a message field reference
    pub fn message_field(name: impl Into<String>) -> Self {
        Expression::MessageField(name.into())
    }

    /// Create a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    /// Create a binary expression
    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a function call expression
    pub fn function_call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// True when the expression can be evaluated without a message or
    /// variables. Function calls are never constant at the AST level; whether
    /// a call may be folded depends on the function implementation.
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::MessageField(_) | Expression::Variable(_) => false,
            Expression::Array(items) => items.iter().all(Expression::is_constant),
            Expression::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            Expression::Unary { operand, .. } => operand.is_constant(),
            Expression::FunctionCall { .. } => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(Value::String(s)) => write!(f, "{:?}", s),
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::MessageField(name) => write!(f, "$message.{}", name),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Expression::Binary { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expression::Unary { op, operand } => match op {
                UnaryOperator::Not => write!(f, "!{}", operand),
                UnaryOperator::Negate => write!(f, "-{}", operand),
            },
            Expression::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_expression() {
        // $message.count > 18
        let expr = Expression::binary(
            Expression::message_field("count"),
            Operator::Gt,
            Expression::literal(18.0),
        );

        match expr {
            Expression::Binary { left, op, right } => {
                assert_eq!(op, Operator::Gt);
                assert_eq!(*left, Expression::MessageField("count".to_string()));
                assert_eq!(*right, Expression::Literal(Value::Number(18.0)));
            }
            _ => panic!("Expected Binary expression"),
        }
    }

    #[test]
    fn test_constant_detection() {
        let constant = Expression::binary(
            Expression::literal(5.0),
            Operator::Add,
            Expression::Array(vec![Expression::literal("a")]),
        );
        assert!(constant.is_constant());

        let dynamic = Expression::binary(
            Expression::literal(5.0),
            Operator::Add,
            Expression::message_field("n"),
        );
        assert!(!dynamic.is_constant());

        let call = Expression::function_call("lowercase", vec![Expression::literal("A")]);
        assert!(!call.is_constant());
    }

    #[test]
    fn test_display_round_trips_visually() {
        let expr = Expression::binary(
            Expression::function_call("has_field", vec![Expression::literal("a")]),
            Operator::And,
            Expression::unary(UnaryOperator::Not, Expression::variable("x")),
        );
        assert_eq!(expr.to_string(), "(has_field(\"a\") && !x)");
    }
}
