//! State snapshots
//!
//! A [`State`] is the fully resolved configuration at one point in time:
//! every pipeline by id and the pipelines connected to each stream. It is
//! built wholesale on reload and never modified afterwards, so any number
//! of interpreter calls may read it at once.

use crate::pipeline::Pipeline;
use crate::scheduler::{StageCache, StageLayout};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct State {
    version: u64,
    pipelines: HashMap<String, Arc<Pipeline>>,
    connections: HashMap<String, Vec<Arc<Pipeline>>>,
    stage_cache: StageCache,
    cache_layouts: bool,
}

impl State {
    /// Build a snapshot. Pipelines connected to each stream are kept sorted
    /// by id with duplicates removed.
    pub fn new(
        version: u64,
        pipelines: HashMap<String, Arc<Pipeline>>,
        connections: HashMap<String, Vec<Arc<Pipeline>>>,
    ) -> Self {
        let connections = connections
            .into_iter()
            .map(|(stream, mut connected)| {
                connected.sort_by(|a, b| a.id().cmp(b.id()));
                connected.dedup_by(|a, b| a.id() == b.id());
                (stream, connected)
            })
            .filter(|(_, connected)| !connected.is_empty())
            .collect();

        Self {
            version,
            pipelines,
            connections,
            stage_cache: StageCache::new(),
            cache_layouts: true,
        }
    }

    /// A snapshot with no pipelines, used before the first reload
    pub fn empty() -> Self {
        Self::new(0, HashMap::new(), HashMap::new())
    }

    /// Enable or disable memoization of stage layouts
    pub fn with_cached_layouts(mut self, enabled: bool) -> Self {
        self.cache_layouts = enabled;
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pipelines(&self) -> &HashMap<String, Arc<Pipeline>> {
        &self.pipelines
    }

    pub fn pipeline(&self, id: &str) -> Option<&Arc<Pipeline>> {
        self.pipelines.get(id)
    }

    pub fn connections(&self) -> &HashMap<String, Vec<Arc<Pipeline>>> {
        &self.connections
    }

    /// Pipelines connected to a stream, empty if there are none
    pub fn pipelines_for_stream(&self, stream_id: &str) -> &[Arc<Pipeline>] {
        self.connections
            .get(stream_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Stage groups for a set of pipelines
    pub fn stage_layout(&self, pipelines: &[Arc<Pipeline>]) -> Arc<StageLayout> {
        if self.cache_layouts {
            self.stage_cache.layout_for(pipelines)
        } else {
            Arc::new(StageLayout::build(pipelines))
        }
    }

    /// Number of memoized stage layouts
    pub fn cached_layouts(&self) -> usize {
        self.stage_cache.len()
    }
}

impl Default for State {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connections_are_sorted_and_deduplicated() {
        let a = Arc::new(Pipeline::empty("a", "A"));
        let b = Arc::new(Pipeline::empty("b", "B"));

        let mut pipelines = HashMap::new();
        pipelines.insert("a".to_string(), Arc::clone(&a));
        pipelines.insert("b".to_string(), Arc::clone(&b));

        let mut connections = HashMap::new();
        connections.insert(
            "s1".to_string(),
            vec![Arc::clone(&b), Arc::clone(&a), Arc::clone(&b)],
        );
        connections.insert("s2".to_string(), vec![]);

        let state = State::new(3, pipelines, connections);

        let ids: Vec<&str> = state.pipelines_for_stream("s1").iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(state.pipelines_for_stream("s2").is_empty());
        assert!(!state.connections().contains_key("s2"));
        assert_eq!(state.version(), 3);
    }

    #[test]
    fn test_uncached_layouts_are_not_memoized() {
        let a = Arc::new(Pipeline::empty("a", "A"));
        let state = State::empty().with_cached_layouts(false);
        state.stage_layout(&[a]);
        assert_eq!(state.cached_layouts(), 0);
    }
}
