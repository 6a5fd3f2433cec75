//! Clock event pipeline.
//!
//! An inbound clock request flows through three stages, in order:
//!
//! 1. [`TagResolver`] maps the physical tag uid to an employee identity.
//! 2. [`EventRecorder`] stamps and persists one immutable [`ClockEvent`].
//! 3. [`BroadcastRelay`] fans the persisted event out to kiosk subscribers.
//!
//! [`ClockService`] drives the stages. A failure in stage 1 or 2 aborts the
//! request before anything is broadcast; nothing in stage 3 can fail it.
//!
//! [`ClockEvent`]: punch_types::ClockEvent
//! [`BroadcastRelay`]: punch_relay::BroadcastRelay

pub mod clock;
pub mod error;
pub mod recorder;
pub mod resolver;
pub mod service;

pub use clock::RecordClock;
pub use error::{ClockError, ClockResult};
pub use recorder::EventRecorder;
pub use resolver::TagResolver;
pub use service::{ClockAck, ClockService};
