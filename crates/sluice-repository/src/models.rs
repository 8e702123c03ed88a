//! Data models for the repository layer
//!
//! Definitions are stored as source text; parsing happens when state is
//! resolved, so one broken definition never prevents the others from
//! loading.

use serde::{Deserialize, Serialize};

/// A stored rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    /// Display name; rule references in pipelines use the name inside the
    /// source, not this title
    pub title: String,
    pub source: String,
}

impl RuleDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source: source.into(),
        }
    }
}

/// A stored pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub id: String,
    pub title: String,
    pub source: String,
}

impl PipelineDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source: source.into(),
        }
    }
}

/// Pipelines connected to one stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConnections {
    #[serde(rename = "stream")]
    pub stream_id: String,
    #[serde(rename = "pipelines", default)]
    pub pipeline_ids: Vec<String>,
}

impl PipelineConnections {
    pub fn new<I, S>(stream_id: impl Into<String>, pipeline_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stream_id: stream_id.into(),
            pipeline_ids: pipeline_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Change notification emitted by writable repositories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    RulesChanged {
        updated: Vec<String>,
        deleted: Vec<String>,
    },
    PipelinesChanged {
        updated: Vec<String>,
        deleted: Vec<String>,
    },
    ConnectionsChanged {
        stream_id: String,
    },
}

impl ChangeEvent {
    pub fn rule_updated(id: impl Into<String>) -> Self {
        ChangeEvent::RulesChanged {
            updated: vec![id.into()],
            deleted: Vec::new(),
        }
    }

    pub fn rule_deleted(id: impl Into<String>) -> Self {
        ChangeEvent::RulesChanged {
            updated: Vec::new(),
            deleted: vec![id.into()],
        }
    }

    pub fn pipeline_updated(id: impl Into<String>) -> Self {
        ChangeEvent::PipelinesChanged {
            updated: vec![id.into()],
            deleted: Vec::new(),
        }
    }

    pub fn pipeline_deleted(id: impl Into<String>) -> Self {
        ChangeEvent::PipelinesChanged {
            updated: Vec::new(),
            deleted: vec![id.into()],
        }
    }
}

/// On-disk layout of `connections.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ConnectionsFile {
    #[serde(default)]
    pub connections: Vec<PipelineConnections>,
}
