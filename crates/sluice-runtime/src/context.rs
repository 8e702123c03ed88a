//! Evaluation context
//!
//! Scratch space for evaluating one stage against one message. Holds the
//! variables bound by `let` actions, the evaluation errors raised so far and
//! any messages created by actions. A fresh context is built for every
//! (message, stage) pair and discarded afterwards.

use crate::error::RuntimeError;
use sluice_core::{Message, Value};
use std::collections::HashMap;

/// An error raised by one rule, already formatted for the message
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationError {
    pub rule_name: String,
    pub error: RuntimeError,
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "For rule '{}': {}", self.rule_name, self.error)
    }
}

/// Per-stage evaluation state for a single message
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    message: &'a mut Message,
    variables: HashMap<String, Value>,
    errors: Vec<EvaluationError>,
    created_messages: Vec<Message>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(message: &'a mut Message) -> Self {
        Self {
            message,
            variables: HashMap::new(),
            errors: Vec::new(),
            created_messages: Vec::new(),
        }
    }

    pub fn message(&self) -> &Message {
        &*self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut *self.message
    }

    /// Bind a variable for the remaining actions of this stage
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Queue a message created by an action
    pub fn add_created_message(&mut self, message: Message) {
        self.created_messages.push(message);
    }

    pub fn created_messages(&self) -> &[Message] {
        &self.created_messages
    }

    /// Hand the created messages over to the caller, leaving none behind
    pub fn take_created_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.created_messages)
    }

    /// Record a rule failure in the context and on the message's
    /// processing error field
    pub fn add_evaluation_error(&mut self, rule_name: &str, error: RuntimeError) {
        let error = EvaluationError {
            rule_name: rule_name.to_string(),
            error,
        };
        self.message.append_processing_error(error.to_string());
        self.errors.push(error);
    }

    pub fn has_evaluation_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn evaluation_errors(&self) -> &[EvaluationError] {
        &self.errors
    }
}
