//! Publish/subscribe relay for clock events.
//!
//! Kiosk displays hold long-lived push connections. Each connection is
//! represented by a bounded queue registered in the [`SubscriberRegistry`];
//! the [`BroadcastRelay`] writes every recorded event to a snapshot of the
//! registered queues.
//!
//! Delivery is best-effort: at most once per connection registered at
//! publish time, no acknowledgement, no replay for late subscribers.

pub mod error;
pub mod message;
pub mod registry;
pub mod relay;

pub use error::DeliveryError;
pub use message::BroadcastMessage;
pub use registry::{SubscriberHandle, SubscriberId, SubscriberRegistry, Subscription};
pub use relay::{BroadcastRelay, PublishReport};
