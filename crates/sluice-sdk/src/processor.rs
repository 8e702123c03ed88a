//! Message processing facade
//!
//! A [`PipelineProcessor`] keeps its own pointer to the latest state it has
//! observed and refreshes it from the updater's subscription in the
//! background. Each call loads that pointer once, so a batch always runs
//! against a single snapshot even if a reload lands midway.

use crate::config::ProcessorConfig;
use crate::error::{Result, SdkError};
use crate::updater::ConfigurationStateUpdater;
use arc_swap::ArcSwap;
use sluice_core::Message;
use sluice_repository::{ChangeEvent, Repository};
use sluice_runtime::{
    FunctionRegistry, InterpreterListener, Journal, NoopInterpreterListener, NoopJournal,
    PipelineInterpreter, State,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct PipelineProcessor {
    updater: Arc<ConfigurationStateUpdater>,
    state: Arc<ArcSwap<State>>,
    interpreter: PipelineInterpreter,
    subscription: JoinHandle<()>,
    event_listener: Option<JoinHandle<()>>,
}

impl PipelineProcessor {
    pub fn builder() -> PipelineProcessorBuilder {
        PipelineProcessorBuilder::new()
    }

    /// Process a batch against the latest observed state
    pub fn process(&self, messages: Vec<Message>) -> Vec<Message> {
        self.process_with_listener(messages, &NoopInterpreterListener)
    }

    pub fn process_with_listener(
        &self,
        messages: Vec<Message>,
        listener: &dyn InterpreterListener,
    ) -> Vec<Message> {
        let state = self.state.load_full();
        self.interpreter.process(messages, listener, &state)
    }

    /// Run one message through the given pipelines, ignoring its streams
    pub fn process_for_pipelines(
        &self,
        message: Message,
        pipeline_ids: &[String],
        listener: &dyn InterpreterListener,
    ) -> Vec<Message> {
        let state = self.state.load_full();
        self.interpreter
            .process_for_pipelines(message, pipeline_ids, listener, &state)
    }

    /// The state this processor currently runs against
    pub fn latest_state(&self) -> Arc<State> {
        self.state.load_full()
    }

    pub fn updater(&self) -> &Arc<ConfigurationStateUpdater> {
        &self.updater
    }
}

impl Drop for PipelineProcessor {
    fn drop(&mut self) {
        self.subscription.abort();
        if let Some(listener) = &self.event_listener {
            listener.abort();
        }
    }
}

/// Follow the updater's published states until it goes away
fn spawn_subscription(
    updater: &ConfigurationStateUpdater,
    state: Arc<ArcSwap<State>>,
) -> JoinHandle<()> {
    let mut published = updater.subscribe();
    tokio::spawn(async move {
        while published.changed().await.is_ok() {
            let next = Arc::clone(&published.borrow_and_update());
            debug!("processor observed state version {}", next.version());
            state.store(next);
        }
    })
}

/// Builder for [`PipelineProcessor`]
///
/// # Example
///
/// ```no_run
/// use sluice_repository::FileSystemRepository;
/// use sluice_sdk::PipelineProcessor;
/// use std::sync::Arc;
///
/// # async fn run() -> sluice_sdk::Result<()> {
/// let repository = Arc::new(FileSystemRepository::new("config")?);
/// let processor = PipelineProcessor::builder()
///     .with_repository(repository)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineProcessorBuilder {
    repository: Option<Arc<dyn Repository>>,
    functions: Option<Arc<FunctionRegistry>>,
    config: ProcessorConfig,
    journal: Option<Arc<dyn Journal>>,
    events: Option<mpsc::Receiver<ChangeEvent>>,
}

impl PipelineProcessorBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            functions: None,
            config: ProcessorConfig::default(),
            journal: None,
            events: None,
        }
    }

    /// Source of rule, pipeline and connection definitions
    pub fn with_repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Functions callable from rules. Defaults to the built-ins.
    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Receives offsets of dropped messages
    pub fn with_journal(mut self, journal: Arc<dyn Journal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Reload whenever an event arrives on this channel
    pub fn with_change_events(mut self, events: mpsc::Receiver<ChangeEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Load the initial state and start following reloads.
    ///
    /// Fails if the repository cannot be read; faulty definitions only
    /// degrade the rules they belong to.
    pub async fn build(self) -> Result<PipelineProcessor> {
        self.config.validate()?;
        let repository = self.repository.ok_or(SdkError::MissingRepository)?;
        let functions = self
            .functions
            .unwrap_or_else(|| Arc::new(FunctionRegistry::with_builtins()));
        let journal = self.journal.unwrap_or_else(|| Arc::new(NoopJournal));

        let interpreter = PipelineInterpreter::new(journal)
            .with_max_processing_passes(self.config.max_processing_passes);

        let updater = Arc::new(ConfigurationStateUpdater::new(
            repository,
            functions,
            self.config,
        ));
        updater.reload_and_publish().await?;

        let state = Arc::new(ArcSwap::new(updater.latest_state()));
        let subscription = spawn_subscription(&updater, Arc::clone(&state));
        let event_listener = self
            .events
            .map(|events| updater.spawn_event_listener(events));

        Ok(PipelineProcessor {
            updater,
            state,
            interpreter,
            subscription,
            event_listener,
        })
    }
}

impl Default for PipelineProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_repository::InMemoryRepository;

    #[tokio::test]
    async fn test_build_requires_repository() {
        let result = PipelineProcessor::builder().build().await;
        assert!(matches!(result, Err(SdkError::MissingRepository)));
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let result = PipelineProcessor::builder()
            .with_repository(Arc::new(InMemoryRepository::new()))
            .with_config(ProcessorConfig::default().with_event_channel_capacity(0))
            .build()
            .await;
        assert!(matches!(result, Err(SdkError::Config(_))));
    }

    #[tokio::test]
    async fn test_build_publishes_initial_state() {
        let processor = PipelineProcessor::builder()
            .with_repository(Arc::new(InMemoryRepository::new()))
            .build()
            .await
            .unwrap();

        assert_eq!(processor.latest_state().version(), 1);
        assert_eq!(processor.updater().latest_state().version(), 1);

        let out = processor.process(vec![Message::with_id("m1").with_stream("s1")]);
        assert_eq!(out.len(), 1);
    }
}
