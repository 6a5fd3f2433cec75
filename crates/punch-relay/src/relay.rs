use std::sync::Arc;

use punch_types::ClockEvent;
use tracing::{debug, error, warn};

use crate::error::DeliveryError;
use crate::message::BroadcastMessage;
use crate::registry::SubscriberRegistry;

/// Outcome of one [`BroadcastRelay::publish`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers in the snapshot, one write attempt each.
    pub attempted: usize,
    pub delivered: usize,
    /// Frames dropped because the subscriber's queue was full.
    pub lagging: usize,
    /// Subscribers found closed and unregistered during this publish.
    pub closed: usize,
}

impl PublishReport {
    pub fn failed(&self) -> usize {
        self.lagging + self.closed
    }
}

/// Fan-out of recorded clock events to every registered subscriber.
///
/// Writes never block: each subscriber has a bounded queue and a write that
/// does not fit is dropped for that subscriber alone.
#[derive(Clone, Debug)]
pub struct BroadcastRelay {
    registry: Arc<SubscriberRegistry>,
}

impl BroadcastRelay {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Write `event` to each subscriber registered at the moment of the call.
    ///
    /// Failures are isolated per subscriber and never retried. A subscriber
    /// whose connection is found closed is unregistered on the spot.
    pub fn publish(&self, event: &ClockEvent) -> PublishReport {
        let frame = match BroadcastMessage::from(event).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!(id = %event.id, error = %e, "failed to serialize broadcast frame");
                return PublishReport::default();
            }
        };

        let snapshot = self.registry.active_subscribers();
        let mut report = PublishReport {
            attempted: snapshot.len(),
            ..PublishReport::default()
        };

        for handle in snapshot {
            match handle.try_write(Arc::clone(&frame)) {
                Ok(()) => report.delivered += 1,
                Err(e @ DeliveryError::Lagging(_)) => {
                    warn!(error = %e, id = %event.id, "subscriber write failed");
                    report.lagging += 1;
                }
                Err(e @ DeliveryError::Closed(_)) => {
                    warn!(error = %e, id = %event.id, "subscriber write failed");
                    self.registry.unregister(handle.id());
                    report.closed += 1;
                }
            }
        }

        debug!(
            id = %event.id,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed(),
            "clock event published"
        );
        report
    }
}
