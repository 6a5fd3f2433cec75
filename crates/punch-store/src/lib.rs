//! Storage for the punch clock relay.
//!
//! Two collections back the relay:
//!
//! - tag bindings, keyed by physical tag uid, read through [`TagStore`]
//! - clock events, an append-only log written through [`EventStore`]
//!
//! # Storage Backends
//!
//! - [`InMemoryTagStore`] -- `HashMap`-based bindings provisioned at start-up
//! - [`InMemoryEventStore`] -- `Vec`-based event log for tests and embedding
//! - [`JournalEventStore`] -- length/CRC framed event journal on disk
//!
//! # Design Rules
//!
//! 1. Events are immutable once appended; nothing is updated or deleted.
//! 2. Appends never read existing records for comparison.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod journal;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use journal::JournalEventStore;
pub use memory::{InMemoryEventStore, InMemoryTagStore};
pub use traits::{EventStore, TagStore};
