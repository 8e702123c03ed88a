//! Common test utilities for interpreter tests

#![allow(dead_code)]

use sluice_core::ast::{PipelineAst, RuleAst};
use sluice_core::Message;
use sluice_parser::{PipelineParser, RuleParser};
use sluice_runtime::{
    FunctionRegistry, InterpreterListener, Journal, Pipeline, Rule, RuntimeError, Stage, State,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// Builds a [`State`] from inline YAML definitions
pub struct TestState {
    rules: Vec<RuleAst>,
    pipelines: Vec<PipelineAst>,
    connections: Vec<(String, Vec<String>)>,
    functions: Arc<FunctionRegistry>,
}

impl TestState {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            pipelines: Vec::new(),
            connections: Vec::new(),
            functions: Arc::new(FunctionRegistry::with_builtins()),
        }
    }

    pub fn with_rule(mut self, yaml: &str) -> Self {
        let id = format!("rule-{}", self.rules.len());
        let rule = RuleParser::parse(&id, yaml).expect("rule should parse");
        self.rules.push(rule);
        self
    }

    pub fn with_pipeline(mut self, id: &str, yaml: &str) -> Self {
        let pipeline = PipelineParser::parse(id, yaml).expect("pipeline should parse");
        self.pipelines.push(pipeline);
        self
    }

    pub fn connect(mut self, stream: &str, pipeline_ids: &[&str]) -> Self {
        self.connections.push((
            stream.to_string(),
            pipeline_ids.iter().map(|id| id.to_string()).collect(),
        ));
        self
    }

    /// Resolve rule references by name. Unknown names become rules that
    /// never match.
    pub fn build(self) -> State {
        let rules: HashMap<String, Rule> = self
            .rules
            .into_iter()
            .map(|ast| {
                (
                    ast.name.clone(),
                    Rule::interpreted(ast, Arc::clone(&self.functions)),
                )
            })
            .collect();

        let mut pipelines = HashMap::new();
        for ast in self.pipelines {
            let id = ast.id.clone().unwrap_or_default();
            let stages = ast
                .stages
                .iter()
                .map(|stage| {
                    let resolved = stage
                        .rule_references
                        .iter()
                        .map(|name| match rules.get(name) {
                            Some(rule) => rule.invokable_copy(),
                            None => Rule::always_false(format!("Unresolved rule {}", name)),
                        })
                        .collect();
                    Stage::new(stage.number, stage.match_policy, resolved)
                })
                .collect();
            pipelines.insert(id.clone(), Arc::new(Pipeline::new(id, ast.name, stages)));
        }

        let mut connections = HashMap::new();
        for (stream, ids) in self.connections {
            let connected: Vec<Arc<Pipeline>> = ids
                .iter()
                .filter_map(|id| pipelines.get(id).cloned())
                .collect();
            connections.insert(stream, connected);
        }

        State::new(1, pipelines, connections)
    }
}

/// Listener that records a compact trace of interpreter events
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Events starting with `prefix`
    pub fn filtered(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl InterpreterListener for RecordingListener {
    fn start_processing(&self) {
        self.push("start".to_string());
    }

    fn finish_processing(&self) {
        self.push("finish".to_string());
    }

    fn process_streams(
        &self,
        _message: &Message,
        pipelines: &[Arc<Pipeline>],
        streams: &BTreeSet<String>,
    ) {
        let ids: Vec<&str> = pipelines.iter().map(|p| p.id()).collect();
        let streams: Vec<&str> = streams.iter().map(String::as_str).collect();
        self.push(format!(
            "streams {} -> {}",
            streams.join(","),
            ids.join(",")
        ));
    }

    fn enter_stage(&self, pipeline: &Pipeline, stage: &Stage) {
        self.push(format!("enter {}:{}", pipeline.id(), stage.number()));
    }

    fn satisfy_rule(&self, rule: &Rule, _pipeline: &Pipeline) {
        self.push(format!("match {}", rule.name()));
    }

    fn dissatisfy_rule(&self, rule: &Rule, _pipeline: &Pipeline) {
        self.push(format!("miss {}", rule.name()));
    }

    fn fail_evaluate_rule(&self, rule: &Rule, _pipeline: &Pipeline, _error: &RuntimeError) {
        self.push(format!("fail-when {}", rule.name()));
    }

    fn execute_rule(&self, rule: &Rule, _pipeline: &Pipeline) {
        self.push(format!("execute {}", rule.name()));
    }

    fn fail_execute_rule(&self, rule: &Rule, _pipeline: &Pipeline, _error: &RuntimeError) {
        self.push(format!("fail-then {}", rule.name()));
    }

    fn finish_execute_rule(&self, rule: &Rule, _pipeline: &Pipeline) {
        self.push(format!("done {}", rule.name()));
    }

    fn stop_pipeline_execution(&self, pipeline: &Pipeline, stage: &Stage) {
        self.push(format!("stop {}:{}", pipeline.id(), stage.number()));
    }
}

/// Journal that remembers committed offsets
#[derive(Default)]
pub struct RecordingJournal {
    offsets: Mutex<Vec<u64>>,
}

impl RecordingJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.offsets.lock().unwrap().clone()
    }
}

impl Journal for RecordingJournal {
    fn mark_offset_committed(&self, offset: u64) {
        self.offsets.lock().unwrap().push(offset);
    }
}

/// A rule with a condition and a list of actions
pub fn rule_yaml(name: &str, when: &str, then: &[&str]) -> String {
    let mut yaml = format!("rule:\n  name: {}\n  when: '{}'\n", name, when.replace('\'', "''"));
    if !then.is_empty() {
        yaml.push_str("  then:\n");
        for action in then {
            yaml.push_str(&format!("    - '{}'\n", action.replace('\'', "''")));
        }
    }
    yaml
}

/// A pipeline from `(stage number, match policy, rule names)` triples
pub fn pipeline_yaml(name: &str, stages: &[(i32, &str, &[&str])]) -> String {
    let mut yaml = format!("pipeline:\n  name: {}\n  stages:\n", name);
    for (number, policy, rules) in stages {
        yaml.push_str(&format!("    - stage: {}\n      match: {}\n      rules:\n", number, policy));
        for rule in rules.iter() {
            yaml.push_str(&format!("        - {}\n", rule));
        }
    }
    yaml
}
