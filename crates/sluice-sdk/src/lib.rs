//! sluice SDK - Pipeline processor facade
//!
//! This crate wires the repository, parser, compiler and runtime together:
//! it resolves stored definitions into state snapshots, reloads them when
//! the repository reports changes, and runs message batches against the
//! latest snapshot.
//!
//! # Example
//!
//! ```no_run
//! use sluice_core::Message;
//! use sluice_repository::{InMemoryRepository, PipelineConnections, WritableRepository};
//! use sluice_sdk::{PipelineProcessor, ProcessorConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     sluice_sdk::init_tracing(sluice_sdk::DEFAULT_FILTER);
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     let repository = Arc::new(InMemoryRepository::with_notifier(tx));
//!     repository
//!         .save_connections(PipelineConnections::new("web", ["cleanup"]))
//!         .await?;
//!
//!     let processor = PipelineProcessor::builder()
//!         .with_repository(repository)
//!         .with_config(ProcessorConfig::default().with_reload_debounce_ms(100))
//!         .with_change_events(rx)
//!         .build()
//!         .await?;
//!
//!     let out = processor.process(vec![Message::new().with_stream("web")]);
//!     println!("{} messages", out.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod processor;
pub mod resolver;
pub mod updater;

pub use config::ProcessorConfig;
pub use error::{Result, SdkError};
pub use observability::{init_tracing, DEFAULT_FILTER};
pub use processor::{PipelineProcessor, PipelineProcessorBuilder};
pub use resolver::StateResolver;
pub use updater::ConfigurationStateUpdater;

// Re-export types callers need alongside the processor
pub use sluice_core::{Message, Value};
pub use sluice_runtime::{
    InterpreterListener, Journal, NoopInterpreterListener, NoopJournal, State,
    TracingInterpreterListener,
};
