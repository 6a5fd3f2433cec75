use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::DeliveryError;

/// Opaque identifier of one subscriber connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Write side of one subscriber connection.
///
/// Cloning a handle does not open a new connection; clones share the same
/// queue.
#[derive(Clone, Debug)]
pub struct SubscriberHandle {
    id: SubscriberId,
    sender: mpsc::Sender<Arc<str>>,
}

impl SubscriberHandle {
    pub fn new(id: SubscriberId, sender: mpsc::Sender<Arc<str>>) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// `false` once the receiving side has been dropped.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Non-blocking write of one frame.
    pub fn try_write(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        self.sender.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Lagging(self.id),
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed(self.id),
        })
    }
}

/// Set of currently connected subscribers.
///
/// One registry per process, created at start-up and never persisted.
/// The set is only reachable through [`register`](Self::register),
/// [`unregister`](Self::unregister) and
/// [`active_subscribers`](Self::active_subscribers); enumeration always
/// works on a copy so concurrent mutation cannot disturb a broadcast in
/// flight.
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    subscribers: RwLock<BTreeMap<SubscriberId, SubscriberHandle>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Allocate an id for a connection about to be registered.
    pub fn next_id(&self) -> SubscriberId {
        SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Add a connection to the live set.
    ///
    /// Returns `false` if a handle with the same id is already registered,
    /// in which case the existing handle is kept.
    pub fn register(&self, handle: SubscriberHandle) -> bool {
        let id = handle.id();
        let mut subs = self.subscribers.write().expect("registry lock poisoned");
        if subs.contains_key(&id) {
            return false;
        }
        subs.insert(id, handle);
        info!(subscriber = %id, active = subs.len(), "subscriber registered");
        true
    }

    /// Remove a connection. Removing an unknown or already removed id is a
    /// no-op; returns whether anything was removed.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut subs = self.subscribers.write().expect("registry lock poisoned");
        let removed = subs.remove(&id).is_some();
        if removed {
            info!(subscriber = %id, active = subs.len(), "subscriber unregistered");
        } else {
            debug!(subscriber = %id, "unregister of unknown subscriber ignored");
        }
        removed
    }

    /// Snapshot of the registered connections, in registration order.
    pub fn active_subscribers(&self) -> Vec<SubscriberHandle> {
        self.subscribers
            .read()
            .expect("registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers
            .read()
            .expect("registry lock poisoned")
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registered handle, ending all open subscriptions once
    /// their queued frames are drained. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut subs = self.subscribers.write().expect("registry lock poisoned");
        let count = subs.len();
        subs.clear();
        info!(count, "all subscribers released");
        count
    }

    /// Open a new subscriber connection with a queue of `capacity` frames.
    ///
    /// The returned [`Subscription`] unregisters itself when dropped.
    pub fn open(self: &Arc<Self>, capacity: usize) -> Subscription {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let id = self.next_id();
        self.register(SubscriberHandle::new(id, tx));
        Subscription {
            id,
            receiver: rx,
            registry: Arc::clone(self),
        }
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("active", &self.len())
            .finish()
    }
}

/// Read side of one subscriber connection.
///
/// Owns the connection's registration: dropping the subscription, whichever
/// side closed the connection, removes the handle from the registry before
/// `drop` returns.
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Arc<str>>,
    registry: Arc<SubscriberRegistry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next frame. Returns `None` once the handle has been
    /// unregistered and every queued frame has been drained.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.receiver.recv().await
    }

    /// Take a queued frame without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.receiver.close();
        self.registry.unregister(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
