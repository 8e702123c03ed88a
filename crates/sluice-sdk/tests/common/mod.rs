//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use sluice_repository::{
    InMemoryRepository, PipelineConnections, PipelineDefinition, RuleDefinition,
    WritableRepository,
};
use sluice_sdk::{Journal, PipelineProcessor};
use std::sync::{Arc, Mutex};
use std::time::Duration;

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
        yaml.push_str(&format!(
            "    - stage: {}\n      match: {}\n      rules:\n",
            number, policy
        ));
        for rule in rules.iter() {
            yaml.push_str(&format!("        - {}\n", rule));
        }
    }
    yaml
}

/// Store a rule under its own name
pub async fn save_rule(repo: &InMemoryRepository, name: &str, when: &str, then: &[&str]) {
    repo.save_rule(RuleDefinition::new(name, name, rule_yaml(name, when, then)))
        .await
        .unwrap();
}

pub async fn save_pipeline(
    repo: &InMemoryRepository,
    id: &str,
    stages: &[(i32, &str, &[&str])],
) {
    repo.save_pipeline(PipelineDefinition::new(id, id, pipeline_yaml(id, stages)))
        .await
        .unwrap();
}

pub async fn connect(repo: &InMemoryRepository, stream: &str, pipeline_ids: &[&str]) {
    repo.save_connections(PipelineConnections::new(
        stream,
        pipeline_ids.iter().copied(),
    ))
    .await
    .unwrap();
}

/// Wait until the processor has observed at least `version`
pub async fn wait_for_version(processor: &PipelineProcessor, version: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while processor.latest_state().version() < version {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("processor should observe the new state");
}

/// Journal that remembers committed offsets
#[derive(Default)]
pub struct RecordingJournal {
    offsets: Mutex<Vec<u64>>,
}

impl RecordingJournal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
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
