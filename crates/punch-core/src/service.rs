use std::sync::Arc;

use punch_relay::{BroadcastRelay, PublishReport};
use punch_store::EventStore;
use punch_types::{ClockAction, ClockEvent};
use tracing::{info, warn};

use crate::error::{ClockError, ClockResult};
use crate::recorder::EventRecorder;
use crate::resolver::TagResolver;

/// Acknowledgement of a successful clock request.
#[derive(Clone, Debug)]
pub struct ClockAck {
    /// Resolved display name, echoed back to the reader.
    pub name: String,
    /// The event as persisted.
    pub event: ClockEvent,
    /// Fan-out outcome. Informational only; never affects the response.
    pub report: PublishReport,
}

/// Resolve, record, then publish.
///
/// Each call runs its steps in order and to completion. Concurrent calls are
/// independent and may interleave at the store and at the registry.
pub struct ClockService {
    resolver: TagResolver,
    recorder: EventRecorder,
    relay: BroadcastRelay,
    events: Arc<dyn EventStore>,
}

impl ClockService {
    pub fn new(
        resolver: TagResolver,
        recorder: EventRecorder,
        relay: BroadcastRelay,
        events: Arc<dyn EventStore>,
    ) -> Self {
        Self {
            resolver,
            recorder,
            relay,
            events,
        }
    }

    pub fn relay(&self) -> &BroadcastRelay {
        &self.relay
    }

    /// Handle one clock request for tag `uid`.
    ///
    /// Both fields are checked before the resolver runs. The event is
    /// published only after it has been persisted.
    pub async fn clock(&self, uid: &str, action: &str) -> ClockResult<ClockAck> {
        let uid = uid.trim();
        if uid.is_empty() || action.is_empty() {
            return Err(ClockError::InvalidInput(
                "uid and action are required".into(),
            ));
        }
        let action: ClockAction = action.parse()?;

        let identity = match self.resolver.resolve(uid).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(tag = uid, error = %e, "clock request rejected");
                return Err(e);
            }
        };

        let event = self.recorder.record(&identity, action).await?;
        let report = self.relay.publish(&event);

        info!(
            tag = uid,
            employee = %event.employee_id,
            action = %event.action,
            subscribers = report.attempted,
            delivered = report.delivered,
            "clock request completed"
        );
        Ok(ClockAck {
            name: identity.name,
            event,
            report,
        })
    }

    /// The most recently persisted event, by recency.
    pub async fn latest(&self) -> ClockResult<Option<ClockEvent>> {
        self.events.latest().await.map_err(ClockError::Lookup)
    }
}
