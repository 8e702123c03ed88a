//! Repository abstraction layer for the sluice pipeline processor
//!
//! This crate provides a unified interface for loading rule definitions,
//! pipeline definitions and stream connections from different storage
//! backends, and for announcing changes to them.
//!
//! # Backends
//!
//! - **In-memory**: writable store for tests and embedding
//! - **File system**: YAML files on disk, one definition per file
//!
//! # Quick Start
//!
//! ```no_run
//! use sluice_repository::{
//!     ChangeEvent, InMemoryRepository, Repository, RuleDefinition, WritableRepository,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(16);
//!     let repo = InMemoryRepository::with_notifier(tx);
//!
//!     repo.save_rule(RuleDefinition::new(
//!         "r1",
//!         "tag errors",
//!         "rule:\n  name: tag errors\n  when: true\n",
//!     ))
//!     .await?;
//!
//!     assert_eq!(rx.recv().await, Some(ChangeEvent::rule_updated("r1")));
//!     assert_eq!(repo.load_all_rules().await?.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod traits;

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Repositories
pub use file_system::FileSystemRepository;
pub use memory::InMemoryRepository;
pub use models::*;
pub use traits::*;
