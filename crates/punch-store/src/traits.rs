use async_trait::async_trait;
use punch_types::{ClockEvent, TagBinding};

use crate::error::StoreResult;

/// Read-only lookup of tag bindings.
///
/// Lookups have no side effects and may be retried freely.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Look up the binding for a physical tag uid.
    ///
    /// Returns `Ok(None)` when no binding exists; `Err` only on backend
    /// failure.
    async fn lookup(&self, tag_uid: &str) -> StoreResult<Option<TagBinding>>;

    /// All bindings currently known, in no particular order.
    async fn bindings(&self) -> StoreResult<Vec<TagBinding>>;
}

/// Append-only clock event log.
///
/// Implementations must satisfy these invariants:
/// - `append` writes exactly one new record and mutates nothing else.
/// - A successful `append` is durable for the backend's notion of durability
///   before it returns; callers publish only after it returns.
/// - `latest` is the event with the newest timestamp; ties go to the later
///   append. Concurrent callers may append slightly out of timestamp order.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist one event.
    async fn append(&self, event: &ClockEvent) -> StoreResult<()>;

    /// The event with the newest timestamp, or `None` if the log is empty.
    async fn latest(&self) -> StoreResult<Option<ClockEvent>>;

    /// Number of events in the log.
    async fn count(&self) -> StoreResult<u64>;
}

/// Event with the newest timestamp; ties go to the later append.
pub(crate) fn newest(events: &[ClockEvent]) -> Option<&ClockEvent> {
    events.iter().max_by_key(|event| event.timestamp)
}
