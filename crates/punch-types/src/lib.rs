//! Foundation types for the punch clock relay.
//!
//! Every other punch crate depends on `punch-types`.
//!
//! # Key Types
//!
//! - [`ClockEvent`] -- An immutable, server-stamped clock-in/clock-out record
//! - [`ClockAction`] -- The `in` / `out` direction of a clock event
//! - [`EmployeeIdentity`] -- Employee id plus denormalized display name
//! - [`TagBinding`] -- Mapping from a physical credential to an employee
//! - [`EventId`] -- UUID v7 record identifier

pub mod action;
pub mod error;
pub mod event;
pub mod identity;

pub use action::ClockAction;
pub use error::TypeError;
pub use event::{ClockEvent, EventId, DEFAULT_METHOD};
pub use identity::{EmployeeIdentity, TagBinding};
