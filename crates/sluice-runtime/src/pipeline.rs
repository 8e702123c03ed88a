//! Resolved pipelines and stages

use crate::observability::Counter;
use crate::rule::Rule;
use sluice_core::ast::MatchPolicy;

/// A numbered step of a pipeline with its resolved rules
#[derive(Debug)]
pub struct Stage {
    number: i32,
    match_policy: MatchPolicy,
    rules: Vec<Rule>,
    executed: Counter,
}

impl Stage {
    pub fn new(number: i32, match_policy: MatchPolicy, rules: Vec<Rule>) -> Self {
        Self {
            number,
            match_policy,
            rules,
            executed: Counter::new(),
        }
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn match_policy(&self) -> MatchPolicy {
        self.match_policy
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Times this stage was run against a message
    pub fn executed(&self) -> &Counter {
        &self.executed
    }

    /// Whether the pipeline may continue after this stage, given how many
    /// of its rules matched. A stage without rules never blocks.
    pub fn allows_continuation(&self, matched: usize) -> bool {
        if self.rules.is_empty() {
            return true;
        }
        match self.match_policy {
            MatchPolicy::All => matched == self.rules.len(),
            MatchPolicy::Any => matched > 0,
        }
    }
}

/// A pipeline with its stages ordered by number
#[derive(Debug)]
pub struct Pipeline {
    id: String,
    name: String,
    stages: Vec<Stage>,
    executed: Counter,
}

impl Pipeline {
    pub fn new(id: impl Into<String>, name: impl Into<String>, mut stages: Vec<Stage>) -> Self {
        stages.sort_by_key(Stage::number);
        Self {
            id: id.into(),
            name: name.into(),
            stages,
            executed: Counter::new(),
        }
    }

    /// A pipeline without stages
    pub fn empty(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Vec::new())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn has_stages(&self) -> bool {
        !self.stages.is_empty()
    }

    /// Times a message entered this pipeline
    pub fn executed(&self) -> &Counter {
        &self.executed
    }
}
