//! File system based repository implementation
//!
//! Layout under the root directory:
//!
//! ```text
//! rules/<id>.yaml
//! pipelines/<id>.yaml
//! connections.yaml
//! ```
//!
//! Ids are file stems; definitions may also use the `.yml` extension. When
//! both `<id>.yaml` and `<id>.yml` exist the `.yaml` file is used. A missing
//! directory or `connections.yaml` reads as empty.

use async_trait::async_trait;
use path_absolutize::Absolutize;
use serde_yaml::Value as YamlValue;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::models::{
    ChangeEvent, ConnectionsFile, PipelineConnections, PipelineDefinition, RuleDefinition,
};
use crate::traits::{ChangeNotifier, Repository, WritableRepository};
use crate::{RepositoryError, RepositoryResult};

const RULES_DIR: &str = "rules";
const PIPELINES_DIR: &str = "pipelines";
const CONNECTIONS_FILE: &str = "connections.yaml";
/// Accepted definition extensions, preferred first
const DEFINITION_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// File system based repository
pub struct FileSystemRepository {
    /// Root path of the repository
    root_path: PathBuf,
    /// Serializes read-modify-write of `connections.yaml`
    connections_lock: Mutex<()>,
    notifier: ChangeNotifier,
}

impl FileSystemRepository {
    /// Open a repository rooted at an existing directory
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.exists() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(|e| RepositoryError::Other(format!("Failed to absolutize path: {}", e)))?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
            connections_lock: Mutex::new(()),
            notifier: ChangeNotifier::default(),
        })
    }

    /// Announce writes on a change channel
    pub fn with_notifier(mut self, sender: mpsc::Sender<ChangeEvent>) -> Self {
        self.notifier = ChangeNotifier::new(sender);
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Read every `*.yaml`/`*.yml` file of a directory as `(stem, content)`,
    /// sorted by stem, one entry per stem
    async fn read_definitions(&self, dir: &str) -> RepositoryResult<Vec<(String, String)>> {
        let dir_path = self.root_path.join(dir);
        if !dir_path.exists() {
            return Ok(Vec::new());
        }

        let mut definitions = Vec::new();
        let mut entries = fs::read_dir(&dir_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(rank) = path
                .extension()
                .and_then(|s| s.to_str())
                .and_then(|ext| DEFINITION_EXTENSIONS.iter().position(|e| *e == ext))
            else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path).await?;
            definitions.push((stem.to_string(), rank, content));
        }

        definitions.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
        definitions.dedup_by(|later, kept| {
            let duplicate = later.0 == kept.0;
            if duplicate {
                warn!(
                    "definition {} exists as both .yaml and .yml in {}, ignoring the .yml file",
                    kept.0,
                    dir_path.display()
                );
            }
            duplicate
        });
        let definitions: Vec<(String, String)> = definitions
            .into_iter()
            .map(|(stem, _, content)| (stem, content))
            .collect();
        debug!("loaded {} definitions from {}", definitions.len(), dir_path.display());
        Ok(definitions)
    }

    /// Candidate files for an id, in extension preference order
    fn definition_paths(&self, dir: &str, id: &str) -> RepositoryResult<Vec<PathBuf>> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(RepositoryError::InvalidPath {
                path: PathBuf::from(id),
            });
        }
        let dir_path = self.root_path.join(dir);
        Ok(DEFINITION_EXTENSIONS
            .iter()
            .map(|ext| dir_path.join(format!("{}.{}", id, ext)))
            .collect())
    }

    /// Overwrite the file an id loads from, or create `<id>.yaml`. Any
    /// shadowed duplicate is removed so the saved source is the one loaded.
    async fn write_definition(&self, dir: &str, id: &str, source: &str) -> RepositoryResult<()> {
        let candidates = self.definition_paths(dir, id)?;
        let mut existing = candidates.iter().filter(|p| p.is_file());
        let target = existing.next().unwrap_or(&candidates[0]).clone();
        let shadowed: Vec<PathBuf> = existing.cloned().collect();

        fs::create_dir_all(self.root_path.join(dir)).await?;
        fs::write(&target, source).await?;
        for path in shadowed {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn remove_definition(&self, dir: &str, id: &str) -> RepositoryResult<()> {
        let existing: Vec<PathBuf> = self
            .definition_paths(dir, id)?
            .into_iter()
            .filter(|p| p.is_file())
            .collect();
        if existing.is_empty() {
            return Err(RepositoryError::IdNotFound { id: id.to_string() });
        }
        for path in existing {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn read_connections_file(&self) -> RepositoryResult<ConnectionsFile> {
        let path = self.root_path.join(CONNECTIONS_FILE);
        if !path.exists() {
            return Ok(ConnectionsFile::default());
        }
        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(ConnectionsFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Display title of a definition: the `name` under its top-level section,
/// falling back to the id when the source does not parse
fn title_of(section: &str, id: &str, source: &str) -> String {
    serde_yaml::from_str::<YamlValue>(source)
        .ok()
        .and_then(|doc| {
            doc.get(section)
                .and_then(|s| s.get("name"))
                .and_then(|n| n.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| id.to_string())
}

#[async_trait]
impl Repository for FileSystemRepository {
    async fn load_all_rules(&self) -> RepositoryResult<Vec<RuleDefinition>> {
        Ok(self
            .read_definitions(RULES_DIR)
            .await?
            .into_iter()
            .map(|(id, source)| {
                let title = title_of("rule", &id, &source);
                RuleDefinition::new(id, title, source)
            })
            .collect())
    }

    async fn load_all_pipelines(&self) -> RepositoryResult<Vec<PipelineDefinition>> {
        Ok(self
            .read_definitions(PIPELINES_DIR)
            .await?
            .into_iter()
            .map(|(id, source)| {
                let title = title_of("pipeline", &id, &source);
                PipelineDefinition::new(id, title, source)
            })
            .collect())
    }

    async fn load_all_connections(&self) -> RepositoryResult<Vec<PipelineConnections>> {
        let mut connections = self.read_connections_file().await?.connections;
        connections.sort_by(|a, b| a.stream_id.cmp(&b.stream_id));
        Ok(connections)
    }
}

#[async_trait]
impl WritableRepository for FileSystemRepository {
    async fn save_rule(&self, rule: RuleDefinition) -> RepositoryResult<()> {
        self.write_definition(RULES_DIR, &rule.id, &rule.source).await?;
        self.notifier.notify(ChangeEvent::rule_updated(rule.id)).await;
        Ok(())
    }

    async fn delete_rule(&self, id: &str) -> RepositoryResult<()> {
        self.remove_definition(RULES_DIR, id).await?;
        self.notifier.notify(ChangeEvent::rule_deleted(id)).await;
        Ok(())
    }

    async fn save_pipeline(&self, pipeline: PipelineDefinition) -> RepositoryResult<()> {
        self.write_definition(PIPELINES_DIR, &pipeline.id, &pipeline.source)
            .await?;
        self.notifier
            .notify(ChangeEvent::pipeline_updated(pipeline.id))
            .await;
        Ok(())
    }

    async fn delete_pipeline(&self, id: &str) -> RepositoryResult<()> {
        self.remove_definition(PIPELINES_DIR, id).await?;
        self.notifier.notify(ChangeEvent::pipeline_deleted(id)).await;
        Ok(())
    }

    async fn save_connections(&self, connections: PipelineConnections) -> RepositoryResult<()> {
        let stream_id = connections.stream_id.clone();
        {
            let _guard = self.connections_lock.lock().await;
            let mut file = self.read_connections_file().await?;
            file.connections.retain(|c| c.stream_id != stream_id);
            if !connections.pipeline_ids.is_empty() {
                file.connections.push(connections);
            }
            file.connections.sort_by(|a, b| a.stream_id.cmp(&b.stream_id));

            let content = serde_yaml::to_string(&file)?;
            fs::write(self.root_path.join(CONNECTIONS_FILE), content).await?;
        }
        self.notifier
            .notify(ChangeEvent::ConnectionsChanged { stream_id })
            .await;
        Ok(())
    }
}
