//! Rule AST definitions

use super::expression::Expression;
use super::statement::Statement;
use crate::types::Value;

/// A parsed rule: a boolean condition plus an ordered list of actions
#[derive(Debug, Clone, PartialEq)]
pub struct RuleAst {
    /// Identifier of the stored definition, if the rule came from one
    pub id: Option<String>,

    /// Human-readable name; pipelines reference rules by this name
    pub name: String,

    /// Condition deciding whether the actions run
    pub when: Expression,

    /// Actions executed in order when the condition holds
    pub then: Vec<Statement>,
}

impl RuleAst {
    /// Create a new rule
    pub fn new(name: impl Into<String>, when: Expression, then: Vec<Statement>) -> Self {
        RuleAst {
            id: None,
            name: name.into(),
            when,
            then,
        }
    }

    /// Set the definition id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// A rule whose condition is the constant `false` and which has no
    /// actions. Used in place of rules that failed to parse or could not be
    /// resolved, so a broken definition disables exactly one rule.
    pub fn always_false(name: impl Into<String>) -> Self {
        RuleAst::new(name, Expression::Literal(Value::Bool(false)), Vec::new())
    }
}
