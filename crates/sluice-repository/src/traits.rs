//! Core trait definitions for the repository pattern
//!
//! - [`Repository`]: bulk loading of every stored definition
//! - [`WritableRepository`]: create, update and delete, each announced as a
//!   [`ChangeEvent`]
//!
//! ```no_run
//! use sluice_repository::{FileSystemRepository, Repository};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let repo = FileSystemRepository::new("repository")?;
//! let rules = repo.load_all_rules().await?;
//! let pipelines = repo.load_all_pipelines().await?;
//! let connections = repo.load_all_connections().await?;
//! println!("{} rules, {} pipelines, {} streams", rules.len(), pipelines.len(), connections.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::{ChangeEvent, PipelineConnections, PipelineDefinition, RuleDefinition};
use crate::RepositoryResult;

/// Read access to stored definitions
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Every stored rule, ordered by id
    async fn load_all_rules(&self) -> RepositoryResult<Vec<RuleDefinition>>;

    /// Every stored pipeline, ordered by id
    async fn load_all_pipelines(&self) -> RepositoryResult<Vec<PipelineDefinition>>;

    /// Stream connections, ordered by stream id
    async fn load_all_connections(&self) -> RepositoryResult<Vec<PipelineConnections>>;
}

/// Write access to stored definitions
#[async_trait]
pub trait WritableRepository: Repository {
    /// Save or update a rule
    async fn save_rule(&self, rule: RuleDefinition) -> RepositoryResult<()>;

    /// Delete a rule; fails with `IdNotFound` if it does not exist
    async fn delete_rule(&self, id: &str) -> RepositoryResult<()>;

    /// Save or update a pipeline
    async fn save_pipeline(&self, pipeline: PipelineDefinition) -> RepositoryResult<()>;

    /// Delete a pipeline; fails with `IdNotFound` if it does not exist
    async fn delete_pipeline(&self, id: &str) -> RepositoryResult<()>;

    /// Replace the pipelines connected to one stream. An empty list removes
    /// the stream's connections.
    async fn save_connections(&self, connections: PipelineConnections) -> RepositoryResult<()>;
}

/// Optional sender for change events.
///
/// Sending never fails the write: a closed or missing receiver only means
/// nobody is listening.
#[derive(Debug, Clone, Default)]
pub struct ChangeNotifier {
    sender: Option<mpsc::Sender<ChangeEvent>>,
}

impl ChangeNotifier {
    pub fn new(sender: mpsc::Sender<ChangeEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub async fn notify(&self, event: ChangeEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).await.is_err() {
                tracing::debug!("change event receiver dropped, event discarded");
            }
        }
    }
}
