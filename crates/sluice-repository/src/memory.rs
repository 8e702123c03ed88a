//! In-memory repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::{mpsc, RwLock};

use crate::models::{ChangeEvent, PipelineConnections, PipelineDefinition, RuleDefinition};
use crate::traits::{ChangeNotifier, Repository, WritableRepository};
use crate::{RepositoryError, RepositoryResult};

/// Repository holding definitions in memory.
///
/// Writes are announced on the change channel passed to
/// [`with_notifier`](Self::with_notifier), if any.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    rules: RwLock<BTreeMap<String, RuleDefinition>>,
    pipelines: RwLock<BTreeMap<String, PipelineDefinition>>,
    connections: RwLock<BTreeMap<String, Vec<String>>>,
    notifier: ChangeNotifier,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(sender: mpsc::Sender<ChangeEvent>) -> Self {
        Self {
            notifier: ChangeNotifier::new(sender),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn load_all_rules(&self) -> RepositoryResult<Vec<RuleDefinition>> {
        Ok(self.rules.read().await.values().cloned().collect())
    }

    async fn load_all_pipelines(&self) -> RepositoryResult<Vec<PipelineDefinition>> {
        Ok(self.pipelines.read().await.values().cloned().collect())
    }

    async fn load_all_connections(&self) -> RepositoryResult<Vec<PipelineConnections>> {
        Ok(self
            .connections
            .read()
            .await
            .iter()
            .map(|(stream, ids)| PipelineConnections::new(stream.clone(), ids.clone()))
            .collect())
    }
}

#[async_trait]
impl WritableRepository for InMemoryRepository {
    async fn save_rule(&self, rule: RuleDefinition) -> RepositoryResult<()> {
        let id = rule.id.clone();
        self.rules.write().await.insert(id.clone(), rule);
        self.notifier.notify(ChangeEvent::rule_updated(id)).await;
        Ok(())
    }

    async fn delete_rule(&self, id: &str) -> RepositoryResult<()> {
        if self.rules.write().await.remove(id).is_none() {
            return Err(RepositoryError::IdNotFound { id: id.to_string() });
        }
        self.notifier.notify(ChangeEvent::rule_deleted(id)).await;
        Ok(())
    }

    async fn save_pipeline(&self, pipeline: PipelineDefinition) -> RepositoryResult<()> {
        let id = pipeline.id.clone();
        self.pipelines.write().await.insert(id.clone(), pipeline);
        self.notifier.notify(ChangeEvent::pipeline_updated(id)).await;
        Ok(())
    }

    async fn delete_pipeline(&self, id: &str) -> RepositoryResult<()> {
        if self.pipelines.write().await.remove(id).is_none() {
            return Err(RepositoryError::IdNotFound { id: id.to_string() });
        }
        self.notifier.notify(ChangeEvent::pipeline_deleted(id)).await;
        Ok(())
    }

    async fn save_connections(&self, connections: PipelineConnections) -> RepositoryResult<()> {
        let stream_id = connections.stream_id.clone();
        {
            let mut all = self.connections.write().await;
            if connections.pipeline_ids.is_empty() {
                all.remove(&stream_id);
            } else {
                all.insert(stream_id.clone(), connections.pipeline_ids);
            }
        }
        self.notifier
            .notify(ChangeEvent::ConnectionsChanged { stream_id })
            .await;
        Ok(())
    }
}
