use std::sync::Arc;

use punch_core::{ClockService, EventRecorder, TagResolver};
use punch_relay::{BroadcastRelay, SubscriberRegistry};
use punch_store::{EventStore, InMemoryEventStore, InMemoryTagStore, JournalEventStore, TagStore};
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Shared handler state: one clock pipeline and one subscriber registry per
/// process.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClockService>,
    pub registry: Arc<SubscriberRegistry>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build stores from `config` and wire up the pipeline.
    pub async fn from_config(config: ServerConfig) -> ServerResult<Self> {
        let tags: Arc<dyn TagStore> =
            Arc::new(config.tags.iter().cloned().collect::<InMemoryTagStore>());
        let events: Arc<dyn EventStore> = match &config.journal_path {
            Some(path) => Arc::new(JournalEventStore::open(path, config.sync_every_write)?),
            None => {
                info!("no journal_path configured; events are kept in memory");
                Arc::new(InMemoryEventStore::new())
            }
        };
        Self::with_stores(config, tags, events).await
    }

    /// Wire up the pipeline over caller-provided stores.
    pub async fn with_stores(
        config: ServerConfig,
        tags: Arc<dyn TagStore>,
        events: Arc<dyn EventStore>,
    ) -> ServerResult<Self> {
        let registry = Arc::new(SubscriberRegistry::new());
        let recorder = EventRecorder::resume(Arc::clone(&events))
            .await?
            .with_method(config.default_method.clone());
        let service = ClockService::new(
            TagResolver::new(tags),
            recorder,
            BroadcastRelay::new(Arc::clone(&registry)),
            events,
        );
        info!(method = %config.default_method, "clock pipeline ready");
        Ok(Self {
            service: Arc::new(service),
            registry,
            config: Arc::new(config),
        })
    }
}
