//! Reloading and publishing state snapshots
//!
//! [`ConfigurationStateUpdater`] owns the current [`State`]. Reloads run one
//! at a time; the result is swapped in atomically and announced on a watch
//! channel, so readers see either the old snapshot or the new one.

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::resolver::StateResolver;
use arc_swap::ArcSwap;
use sluice_repository::{ChangeEvent, Repository};
use sluice_runtime::{FunctionRegistry, State};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub struct ConfigurationStateUpdater {
    repository: Arc<dyn Repository>,
    resolver: StateResolver,
    config: ProcessorConfig,
    reload_lock: Mutex<()>,
    latest: ArcSwap<State>,
    publisher: watch::Sender<Arc<State>>,
    version: AtomicU64,
}

impl ConfigurationStateUpdater {
    /// Create an updater holding the empty state. Nothing is loaded until
    /// the first reload.
    pub fn new(
        repository: Arc<dyn Repository>,
        functions: Arc<FunctionRegistry>,
        config: ProcessorConfig,
    ) -> Self {
        let initial = Arc::new(State::empty());
        let (publisher, _) = watch::channel(Arc::clone(&initial));
        Self {
            repository,
            resolver: StateResolver::new(functions, &config),
            config,
            reload_lock: Mutex::new(()),
            latest: ArcSwap::new(initial),
            publisher,
            version: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Load every definition and build a new snapshot without publishing it
    pub async fn reload(&self) -> Result<Arc<State>> {
        let _guard = self.reload_lock.lock().await;
        self.load_state().await
    }

    /// Reload and make the result the latest state
    pub async fn reload_and_publish(&self) -> Result<Arc<State>> {
        let _guard = self.reload_lock.lock().await;
        match self.load_state().await {
            Ok(state) => {
                self.latest.store(Arc::clone(&state));
                self.publisher.send_replace(Arc::clone(&state));
                info!(
                    "Published pipeline state version {} ({} pipelines)",
                    state.version(),
                    state.pipelines().len()
                );
                Ok(state)
            }
            Err(e) => {
                error!("Failed to reload pipeline state: {}", e);
                Err(e)
            }
        }
    }

    async fn load_state(&self) -> Result<Arc<State>> {
        let rules = self.repository.load_all_rules().await?;
        let pipelines = self.repository.load_all_pipelines().await?;
        let connections = self.repository.load_all_connections().await?;

        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Arc::new(self.resolver.resolve(
            version,
            &rules,
            &pipelines,
            &connections,
        )))
    }

    /// The most recently published state
    pub fn latest_state(&self) -> Arc<State> {
        self.latest.load_full()
    }

    /// Receive every state published from now on
    pub fn subscribe(&self) -> watch::Receiver<Arc<State>> {
        self.publisher.subscribe()
    }

    /// A bounded channel sized for change events
    pub fn event_channel(&self) -> (mpsc::Sender<ChangeEvent>, mpsc::Receiver<ChangeEvent>) {
        mpsc::channel(self.config.event_channel_capacity)
    }

    /// Reload whenever change events arrive. Events that queue up while a
    /// reload runs, or within the debounce window, are merged into the next
    /// reload. The task ends when every sender is dropped.
    pub fn spawn_event_listener(
        self: &Arc<Self>,
        mut events: mpsc::Receiver<ChangeEvent>,
    ) -> JoinHandle<()> {
        let updater = Arc::clone(self);
        let debounce = Duration::from_millis(self.config.reload_debounce_ms);

        tokio::spawn(async move {
            while let Some(first) = events.recv().await {
                if !debounce.is_zero() {
                    tokio::time::sleep(debounce).await;
                }

                let mut merged = 1;
                while events.try_recv().is_ok() {
                    merged += 1;
                }
                debug!("reloading after {} change events, first: {:?}", merged, first);

                // Failures are logged by reload_and_publish; keep listening
                let _ = updater.reload_and_publish().await;
            }
            debug!("change event channel closed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_repository::{InMemoryRepository, RuleDefinition, WritableRepository};

    fn updater(repo: Arc<InMemoryRepository>) -> ConfigurationStateUpdater {
        ConfigurationStateUpdater::new(
            repo,
            Arc::new(FunctionRegistry::with_builtins()),
            ProcessorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_reload_does_not_publish() {
        let updater = updater(Arc::new(InMemoryRepository::new()));

        let state = updater.reload().await.unwrap();
        assert_eq!(state.version(), 1);
        assert_eq!(updater.latest_state().version(), 0);
    }

    #[tokio::test]
    async fn test_versions_increase_with_each_publish() {
        let repo = Arc::new(InMemoryRepository::new());
        let updater = updater(Arc::clone(&repo));
        let mut subscription = updater.subscribe();

        updater.reload_and_publish().await.unwrap();
        assert!(subscription.has_changed().unwrap());
        assert_eq!(subscription.borrow_and_update().version(), 1);

        repo.save_rule(RuleDefinition::new(
            "r1",
            "r1",
            "rule:\n  name: r1\n  when: true\n",
        ))
        .await
        .unwrap();
        let state = updater.reload_and_publish().await.unwrap();
        assert_eq!(state.version(), 2);
        assert_eq!(updater.latest_state().version(), 2);
        assert_eq!(subscription.borrow().version(), 2);
    }

    #[tokio::test]
    async fn test_event_listener_stops_when_senders_drop() {
        let updater = Arc::new(updater(Arc::new(InMemoryRepository::new())));
        let (tx, rx) = updater.event_channel();
        let handle = updater.spawn_event_listener(rx);

        tx.send(ChangeEvent::rule_updated("r1")).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(updater.latest_state().version(), 1);
    }
}
