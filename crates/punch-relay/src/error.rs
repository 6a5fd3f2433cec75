use crate::registry::SubscriberId;

/// Per-subscriber write failure.
///
/// Never surfaced to the publisher's caller; the relay logs it and moves on
/// to the next subscriber.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The subscriber's queue is full; the frame was dropped.
    #[error("subscriber {0} is lagging; frame dropped")]
    Lagging(SubscriberId),

    /// The subscriber's connection has gone away.
    #[error("subscriber {0} is closed")]
    Closed(SubscriberId),
}
