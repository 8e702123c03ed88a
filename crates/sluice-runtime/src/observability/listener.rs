//! Interpreter listeners
//!
//! A listener observes the interpreter at fixed points. It cannot influence
//! control flow; every hook defaults to doing nothing.

use crate::error::RuntimeError;
use crate::pipeline::{Pipeline, Stage};
use crate::rule::Rule;
use sluice_core::Message;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::trace;

#[allow(unused_variables)]
pub trait InterpreterListener: Send + Sync {
    fn start_processing(&self) {}

    fn finish_processing(&self) {}

    /// Pipelines selected for a message from its current streams
    fn process_streams(&self, message: &Message, pipelines: &[Arc<Pipeline>], streams: &BTreeSet<String>) {}

    fn enter_stage(&self, pipeline: &Pipeline, stage: &Stage) {}

    fn exit_stage(&self, pipeline: &Pipeline, stage: &Stage) {}

    fn evaluate_rule(&self, rule: &Rule, pipeline: &Pipeline) {}

    fn fail_evaluate_rule(&self, rule: &Rule, pipeline: &Pipeline, error: &RuntimeError) {}

    fn satisfy_rule(&self, rule: &Rule, pipeline: &Pipeline) {}

    fn dissatisfy_rule(&self, rule: &Rule, pipeline: &Pipeline) {}

    fn execute_rule(&self, rule: &Rule, pipeline: &Pipeline) {}

    fn fail_execute_rule(&self, rule: &Rule, pipeline: &Pipeline, error: &RuntimeError) {}

    fn finish_execute_rule(&self, rule: &Rule, pipeline: &Pipeline) {}

    fn continue_pipeline_execution(&self, pipeline: &Pipeline, stage: &Stage) {}

    fn stop_pipeline_execution(&self, pipeline: &Pipeline, stage: &Stage) {}
}

/// Listener that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInterpreterListener;

impl InterpreterListener for NoopInterpreterListener {}

/// Listener that emits a `trace!` event at every hook
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterpreterListener;

impl InterpreterListener for TracingInterpreterListener {
    fn start_processing(&self) {
        trace!("starting message processing");
    }

    fn finish_processing(&self) {
        trace!("finished message processing");
    }

    fn process_streams(&self, message: &Message, pipelines: &[Arc<Pipeline>], streams: &BTreeSet<String>) {
        let names: Vec<&str> = pipelines.iter().map(|p| p.name()).collect();
        trace!("[{}] streams {:?} select pipelines {:?}", message.id(), streams, names);
    }

    fn enter_stage(&self, pipeline: &Pipeline, stage: &Stage) {
        trace!(
            "enter stage {} of pipeline `{}` (match {})",
            stage.number(),
            pipeline.name(),
            stage.match_policy()
        );
    }

    fn exit_stage(&self, pipeline: &Pipeline, stage: &Stage) {
        trace!("exit stage {} of pipeline `{}`", stage.number(), pipeline.name());
    }

    fn evaluate_rule(&self, rule: &Rule, pipeline: &Pipeline) {
        trace!("evaluate rule `{}` in pipeline `{}`", rule.name(), pipeline.name());
    }

    fn fail_evaluate_rule(&self, rule: &Rule, pipeline: &Pipeline, error: &RuntimeError) {
        trace!(
            "evaluation of rule `{}` in pipeline `{}` failed: {}",
            rule.name(),
            pipeline.name(),
            error
        );
    }

    fn satisfy_rule(&self, rule: &Rule, pipeline: &Pipeline) {
        trace!("rule `{}` in pipeline `{}` matched", rule.name(), pipeline.name());
    }

    fn dissatisfy_rule(&self, rule: &Rule, pipeline: &Pipeline) {
        trace!("rule `{}` in pipeline `{}` did not match", rule.name(), pipeline.name());
    }

    fn execute_rule(&self, rule: &Rule, pipeline: &Pipeline) {
        trace!("execute rule `{}` in pipeline `{}`", rule.name(), pipeline.name());
    }

    fn fail_execute_rule(&self, rule: &Rule, pipeline: &Pipeline, error: &RuntimeError) {
        trace!(
            "execution of rule `{}` in pipeline `{}` failed: {}",
            rule.name(),
            pipeline.name(),
            error
        );
    }

    fn finish_execute_rule(&self, rule: &Rule, pipeline: &Pipeline) {
        trace!("finished rule `{}` in pipeline `{}`", rule.name(), pipeline.name());
    }

    fn continue_pipeline_execution(&self, pipeline: &Pipeline, stage: &Stage) {
        trace!(
            "pipeline `{}` continues after stage {}",
            pipeline.name(),
            stage.number()
        );
    }

    fn stop_pipeline_execution(&self, pipeline: &Pipeline, stage: &Stage) {
        trace!("pipeline `{}` stops at stage {}", pipeline.name(), stage.number());
    }
}
