//! Pipeline interpreter
//!
//! Runs batches of messages through the pipelines connected to their
//! streams. A message whose streams change while it is processed goes
//! around again so pipelines on the new streams see it too; each
//! (message, stream) pair is processed at most once per call.

use crate::context::EvaluationContext;
use crate::journal::Journal;
use crate::observability::InterpreterListener;
use crate::pipeline::{Pipeline, Stage};
use crate::rule::Rule;
use crate::state::State;
use sluice_core::Message;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default bound on passes over the work list in one `process` call
pub const DEFAULT_MAX_PROCESSING_PASSES: usize = 100;

/// The message processing loop
pub struct PipelineInterpreter {
    journal: Arc<dyn Journal>,
    max_processing_passes: Option<usize>,
}

impl PipelineInterpreter {
    pub fn new(journal: Arc<dyn Journal>) -> Self {
        Self {
            journal,
            max_processing_passes: Some(DEFAULT_MAX_PROCESSING_PASSES),
        }
    }

    /// Bound the number of passes over the work list. Messages still
    /// gaining streams when the bound is hit are returned with a processing
    /// error. `None` removes the bound; a bound of zero is raised to one so
    /// every message runs at least once.
    pub fn with_max_processing_passes(mut self, passes: Option<usize>) -> Self {
        self.max_processing_passes = passes.map(|limit| limit.max(1));
        self
    }

    pub fn max_processing_passes(&self) -> Option<usize> {
        self.max_processing_passes
    }

    /// Process a batch of messages against one state snapshot.
    ///
    /// Returns every message that was not dropped, plus any messages created
    /// by rule actions along the way.
    pub fn process(
        &self,
        messages: Vec<Message>,
        listener: &dyn InterpreterListener,
        state: &State,
    ) -> Vec<Message> {
        listener.start_processing();

        // message id -> streams already processed for it
        let mut processed_streams: HashMap<String, HashSet<String>> = HashMap::new();
        let mut fully_processed = Vec::with_capacity(messages.len());
        let mut to_process = messages;
        let mut passes = 0usize;

        while !to_process.is_empty() {
            if let Some(limit) = self.max_processing_passes {
                if passes >= limit {
                    warn!(
                        "processing aborted after {} passes with {} messages still gaining streams",
                        limit,
                        to_process.len()
                    );
                    for mut message in to_process.drain(..) {
                        message.append_processing_error(format!(
                            "processing aborted after {} passes",
                            limit
                        ));
                        fully_processed.push(message);
                    }
                    break;
                }
            }
            passes += 1;

            let current = std::mem::take(&mut to_process);
            for mut message in current {
                let msg_id = message.id().to_string();
                let initial_streams = message.streams().clone();
                let blacklist = processed_streams.get(&msg_id);

                let active_streams = connected_streams(&initial_streams, blacklist, state);
                let pipelines = select_pipelines(&active_streams, state);
                listener.process_streams(&message, &pipelines, &active_streams);
                debug!(
                    "[{}] running pipelines {:?} for streams {:?}",
                    msg_id,
                    pipelines.iter().map(|p| p.name()).collect::<Vec<_>>(),
                    active_streams
                );

                let created = self.process_for_resolved_pipelines(
                    &mut message,
                    &msg_id,
                    &pipelines,
                    listener,
                    state,
                );
                to_process.extend(created);

                // Only streams the message already had are marked processed;
                // new ones still need their pipelines run
                let mut added_streams = false;
                let seen = processed_streams.entry(msg_id.clone()).or_default();
                for stream in message.streams() {
                    if initial_streams.contains(stream) {
                        seen.insert(stream.clone());
                    } else {
                        added_streams = true;
                    }
                }

                if message.filter_out() {
                    debug!("[{}] marked message to be discarded, dropping message", msg_id);
                    if let Some(offset) = message.journal_offset() {
                        self.journal.mark_offset_committed(offset);
                    }
                } else if !added_streams {
                    debug!("[{}] no new streams matched, not running again", msg_id);
                    fully_processed.push(message);
                } else {
                    debug!("[{}] new streams assigned, running again for those streams", msg_id);
                    to_process.push(message);
                }
            }
        }

        listener.finish_processing();
        fully_processed
    }

    /// Run one message through an explicit set of pipelines, ignoring its
    /// streams. Unknown pipeline ids are skipped.
    ///
    /// Returns the processed message followed by any messages its rules
    /// created. The message is returned even if a rule dropped it.
    pub fn process_for_pipelines(
        &self,
        mut message: Message,
        pipeline_ids: &[String],
        listener: &dyn InterpreterListener,
        state: &State,
    ) -> Vec<Message> {
        let mut pipelines: Vec<Arc<Pipeline>> = pipeline_ids
            .iter()
            .filter_map(|id| state.pipeline(id).cloned())
            .collect();
        pipelines.sort_by(|a, b| a.id().cmp(b.id()));
        pipelines.dedup_by(|a, b| a.id() == b.id());

        let msg_id = message.id().to_string();
        let created =
            self.process_for_resolved_pipelines(&mut message, &msg_id, &pipelines, listener, state);

        let mut result = Vec::with_capacity(created.len() + 1);
        result.push(message);
        result.extend(created);
        result
    }

    /// Run the stage groups of `pipelines` in order. Returns the messages
    /// created by rule actions.
    fn process_for_resolved_pipelines(
        &self,
        message: &mut Message,
        msg_id: &str,
        pipelines: &[Arc<Pipeline>],
        listener: &dyn InterpreterListener,
        state: &State,
    ) -> Vec<Message> {
        let mut created = Vec::new();
        if pipelines.is_empty() {
            return created;
        }

        for pipeline in pipelines {
            pipeline.executed().inc();
        }

        let layout = state.stage_layout(pipelines);
        let mut stopped: HashSet<&str> = HashSet::new();

        for (number, stages) in layout.groups() {
            for stage_ref in stages {
                let pipeline = stage_ref.pipeline();
                if stopped.contains(pipeline.id()) {
                    debug!(
                        "[{}] previous stage result prevents further processing of pipeline `{}`",
                        msg_id,
                        pipeline.name()
                    );
                    continue;
                }

                let stage = stage_ref.stage();
                debug!(
                    "[{}] evaluating rule conditions in stage {}: match {}",
                    msg_id,
                    number,
                    stage.match_policy()
                );

                if !self.run_stage(message, msg_id, pipeline, stage, listener, &mut created) {
                    stopped.insert(pipeline.id());
                }
            }
        }

        created
    }

    /// Evaluate every condition of a stage, then run the actions of the
    /// rules that matched. Returns whether the pipeline may continue.
    fn run_stage(
        &self,
        message: &mut Message,
        msg_id: &str,
        pipeline: &Pipeline,
        stage: &Stage,
        listener: &dyn InterpreterListener,
        created: &mut Vec<Message>,
    ) -> bool {
        stage.executed().inc();
        listener.enter_stage(pipeline, stage);

        let mut ctx = EvaluationContext::new(message);
        let mut scheduled: Vec<&Rule> = Vec::with_capacity(stage.rules().len());

        for rule in stage.rules() {
            listener.evaluate_rule(rule, pipeline);
            rule.metrics().evaluated.inc();

            match rule.evaluate_condition(&mut ctx) {
                Ok(true) => {
                    debug!("[{}] rule `{}` matches, scheduling to run", msg_id, rule.name());
                    rule.metrics().matched.inc();
                    listener.satisfy_rule(rule, pipeline);
                    scheduled.push(rule);
                }
                Ok(false) => {
                    debug!("[{}] rule `{}` does not match", msg_id, rule.name());
                    rule.metrics().not_matched.inc();
                    listener.dissatisfy_rule(rule, pipeline);
                }
                Err(error) => {
                    debug!(
                        "[{}] evaluating condition of rule `{}` failed: {}",
                        msg_id,
                        rule.name(),
                        error
                    );
                    rule.metrics().failed.inc();
                    listener.fail_evaluate_rule(rule, pipeline, &error);
                    ctx.add_evaluation_error(rule.name(), error);
                }
            }
        }

        for rule in scheduled.iter().copied() {
            debug!("[{}] rule `{}` matched running actions", msg_id, rule.name());
            listener.execute_rule(rule, pipeline);

            match rule.execute(&mut ctx) {
                Ok(()) => {
                    rule.metrics().executed.inc();
                    listener.finish_execute_rule(rule, pipeline);
                }
                Err(error) => {
                    debug!(
                        "[{}] executing rule `{}` failed, skipping remaining rules of stage {}: {}",
                        msg_id,
                        rule.name(),
                        stage.number(),
                        error
                    );
                    rule.metrics().failed.inc();
                    listener.fail_execute_rule(rule, pipeline, &error);
                    listener.finish_execute_rule(rule, pipeline);
                    ctx.add_evaluation_error(rule.name(), error);
                    break;
                }
            }
        }

        let proceed = stage.allows_continuation(scheduled.len());
        if proceed {
            debug!(
                "[{}] stage {} for pipeline `{}` required match: {}, ok to proceed with next stage",
                msg_id,
                stage.number(),
                pipeline.name(),
                stage.match_policy()
            );
            listener.continue_pipeline_execution(pipeline, stage);
        } else {
            debug!(
                "[{}] stage {} for pipeline `{}` required match: {}, NOT ok to proceed with next stage",
                msg_id,
                stage.number(),
                pipeline.name(),
                stage.match_policy()
            );
            listener.stop_pipeline_execution(pipeline, stage);
        }

        created.extend(ctx.take_created_messages());
        listener.exit_stage(pipeline, stage);
        proceed
    }
}

/// Streams not yet processed for this message that have pipelines connected
fn connected_streams(
    streams: &BTreeSet<String>,
    blacklist: Option<&HashSet<String>>,
    state: &State,
) -> BTreeSet<String> {
    streams
        .iter()
        .filter(|stream| blacklist.map_or(true, |seen| !seen.contains(*stream)))
        .filter(|stream| !state.pipelines_for_stream(stream).is_empty())
        .cloned()
        .collect()
}

/// Union of the pipelines connected to `streams`, ordered by pipeline id
fn select_pipelines(streams: &BTreeSet<String>, state: &State) -> Vec<Arc<Pipeline>> {
    let mut selected: Vec<Arc<Pipeline>> = streams
        .iter()
        .flat_map(|stream| state.pipelines_for_stream(stream).iter().cloned())
        .collect();
    selected.sort_by(|a, b| a.id().cmp(b.id()));
    selected.dedup_by(|a, b| a.id() == b.id());
    selected
}
