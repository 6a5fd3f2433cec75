use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use punch_types::{ClockEvent, TagBinding};

use crate::error::StoreResult;
use crate::traits::{newest, EventStore, TagStore};

/// In-memory tag bindings keyed by tag uid.
///
/// Bindings are provisioned once at start-up; later entries with the same
/// uid replace earlier ones.
pub struct InMemoryTagStore {
    bindings: RwLock<HashMap<String, TagBinding>>,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Provision a binding, returning the one it replaced, if any.
    pub fn insert(&self, binding: TagBinding) -> Option<TagBinding> {
        self.bindings
            .write()
            .expect("lock poisoned")
            .insert(binding.tag_uid.clone(), binding)
    }

    pub fn len(&self) -> usize {
        self.bindings.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryTagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<TagBinding> for InMemoryTagStore {
    fn from_iter<I: IntoIterator<Item = TagBinding>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|b| (b.tag_uid.clone(), b))
            .collect();
        Self {
            bindings: RwLock::new(map),
        }
    }
}

#[async_trait]
impl TagStore for InMemoryTagStore {
    async fn lookup(&self, tag_uid: &str) -> StoreResult<Option<TagBinding>> {
        let map = self.bindings.read().expect("lock poisoned");
        Ok(map.get(tag_uid).cloned())
    }

    async fn bindings(&self) -> StoreResult<Vec<TagBinding>> {
        let map = self.bindings.read().expect("lock poisoned");
        Ok(map.values().cloned().collect())
    }
}

impl std::fmt::Debug for InMemoryTagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTagStore")
            .field("binding_count", &self.len())
            .finish()
    }
}

/// In-memory, `Vec`-based event log.
///
/// Intended for tests and embedding. Contents are lost when dropped.
pub struct InMemoryEventStore {
    events: RwLock<Vec<ClockEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of every appended event, oldest first.
    pub fn events(&self) -> Vec<ClockEvent> {
        self.events.read().expect("lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &ClockEvent) -> StoreResult<()> {
        self.events
            .write()
            .expect("lock poisoned")
            .push(event.clone());
        Ok(())
    }

    async fn latest(&self) -> StoreResult<Option<ClockEvent>> {
        let events = self.events.read().expect("lock poisoned");
        Ok(newest(&events).cloned())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.len() as u64)
    }
}

impl std::fmt::Debug for InMemoryEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventStore")
            .field("event_count", &self.len())
            .finish()
    }
}
