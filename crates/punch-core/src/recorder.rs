use std::sync::Arc;

use punch_store::EventStore;
use punch_types::{ClockAction, ClockEvent, EmployeeIdentity, DEFAULT_METHOD};
use tracing::info;

use crate::clock::RecordClock;
use crate::error::{ClockError, ClockResult};

/// Validates and persists clock actions as immutable events.
///
/// The recorder never reads existing events to decide whether to write;
/// clocking `in` twice in a row records two events.
pub struct EventRecorder {
    store: Arc<dyn EventStore>,
    clock: RecordClock,
    method: String,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            clock: RecordClock::new(),
            method: DEFAULT_METHOD.to_string(),
        }
    }

    /// Build a recorder whose clock starts no earlier than the newest event
    /// already in `store`.
    pub async fn resume(store: Arc<dyn EventStore>) -> ClockResult<Self> {
        let clock = match store.latest().await.map_err(ClockError::Lookup)? {
            Some(event) => RecordClock::resume_after(event.timestamp),
            None => RecordClock::new(),
        };
        Ok(Self {
            store,
            clock,
            method: DEFAULT_METHOD.to_string(),
        })
    }

    /// Provenance tag stamped on every event from this recorder.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Stamp and persist one event for `identity`.
    ///
    /// Input is validated before the store is touched. The returned event is
    /// exactly what was persisted.
    pub async fn record(
        &self,
        identity: &EmployeeIdentity,
        action: ClockAction,
    ) -> ClockResult<ClockEvent> {
        identity.validate()?;

        let event = ClockEvent::new(identity, action, self.method.as_str(), self.clock.now());
        self.store
            .append(&event)
            .await
            .map_err(ClockError::Persistence)?;

        info!(
            id = %event.id,
            employee = %event.employee_id,
            action = %event.action,
            method = %event.method,
            "clock event recorded"
        );
        Ok(event)
    }
}
