//! Pipeline AST definitions
//!
//! A pipeline is an ordered set of numbered stages. Stages reference rules by
//! name; the references are resolved against the loaded rules later, when a
//! state snapshot is built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed pipeline definition
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineAst {
    /// Identifier of the stored definition
    pub id: Option<String>,

    /// Human-readable name
    pub name: String,

    /// Stages in declaration order (numbers may be sparse and unordered here)
    pub stages: Vec<StageAst>,
}

/// A numbered step within a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct StageAst {
    /// Stage ordinal; stages run in ascending order
    pub number: i32,

    /// How many rule conditions must hold for the pipeline to continue
    pub match_policy: MatchPolicy,

    /// Names of the rules in this stage, in evaluation order
    pub rule_references: Vec<String>,
}

/// Stage continuation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Every rule in the stage must match
    All,
    /// At least one rule in the stage must match
    #[serde(alias = "either")]
    Any,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::All => f.write_str("all"),
            MatchPolicy::Any => f.write_str("any"),
        }
    }
}

impl PipelineAst {
    /// Create a new pipeline
    pub fn new(name: impl Into<String>, stages: Vec<StageAst>) -> Self {
        PipelineAst {
            id: None,
            name: name.into(),
            stages,
        }
    }

    /// Set the definition id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// A pipeline without stages, used in place of a definition that could
    /// not be parsed
    pub fn empty(name: impl Into<String>) -> Self {
        PipelineAst::new(name, Vec::new())
    }
}

impl StageAst {
    pub fn new(number: i32, match_policy: MatchPolicy, rule_references: Vec<String>) -> Self {
        StageAst {
            number,
            match_policy,
            rule_references,
        }
    }
}
