//! Stage scheduling across pipelines
//!
//! When several pipelines run for the same message their stages are
//! interleaved by number: every pipeline's stage 0 runs before any
//! pipeline's stage 1. A [`StageLayout`] holds that interleaving for one set
//! of pipelines and [`StageCache`] memoizes layouts per pipeline set.

use crate::pipeline::{Pipeline, Stage};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One pipeline's stage at a given stage number
#[derive(Debug, Clone)]
pub struct StageRef {
    pipeline: Arc<Pipeline>,
    index: usize,
}

impl StageRef {
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn stage(&self) -> &Stage {
        &self.pipeline.stages()[self.index]
    }
}

/// Ordered stage groups for a set of pipelines
#[derive(Debug, Default)]
pub struct StageLayout {
    groups: BTreeMap<i32, Vec<StageRef>>,
}

impl StageLayout {
    /// Group the stages of `pipelines` by stage number. Within a group,
    /// stages follow the order of `pipelines`.
    pub fn build(pipelines: &[Arc<Pipeline>]) -> Self {
        let mut groups: BTreeMap<i32, Vec<StageRef>> = BTreeMap::new();
        for pipeline in pipelines {
            for (index, stage) in pipeline.stages().iter().enumerate() {
                groups.entry(stage.number()).or_default().push(StageRef {
                    pipeline: Arc::clone(pipeline),
                    index,
                });
            }
        }
        Self { groups }
    }

    /// Lowest and highest stage number present
    pub fn extent(&self) -> Option<(i32, i32)> {
        let min = self.groups.keys().next()?;
        let max = self.groups.keys().next_back()?;
        Some((*min, *max))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of non-empty stage groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Stage groups in ascending stage number order. Numbers with no stage
    /// in any pipeline are not yielded.
    pub fn groups(&self) -> impl Iterator<Item = (i32, &[StageRef])> + '_ {
        self.groups
            .iter()
            .map(|(number, stages)| (*number, stages.as_slice()))
    }
}

/// Identity of a pipeline set within one state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineSetKey(Vec<String>);

impl PipelineSetKey {
    pub fn of(pipelines: &[Arc<Pipeline>]) -> Self {
        let mut ids: Vec<String> = pipelines.iter().map(|p| p.id().to_string()).collect();
        ids.sort();
        ids.dedup();
        Self(ids)
    }
}

/// Concurrent memo of stage layouts keyed by pipeline set.
///
/// Pipeline ids are unique within a snapshot and each snapshot owns its
/// cache, so the id set identifies the exact pipeline objects.
#[derive(Debug, Default)]
pub struct StageCache {
    layouts: DashMap<PipelineSetKey, Arc<StageLayout>>,
}

impl StageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout for `pipelines`, computing it at most once per pipeline set.
    /// Concurrent misses on the same key wait on the shard lock while the
    /// first caller builds the layout.
    pub fn layout_for(&self, pipelines: &[Arc<Pipeline>]) -> Arc<StageLayout> {
        let key = PipelineSetKey::of(pipelines);
        if let Some(layout) = self.layouts.get(&key) {
            return Arc::clone(layout.value());
        }

        let entry = self
            .layouts
            .entry(key)
            .or_insert_with(|| Arc::new(StageLayout::build(pipelines)));
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
