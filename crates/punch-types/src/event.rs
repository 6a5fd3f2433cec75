use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ClockAction;
use crate::identity::EmployeeIdentity;

/// Provenance tag applied when the caller does not name one.
pub const DEFAULT_METHOD: &str = "RFID";

/// Unique identifier for a persisted clock event (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(uuid::Uuid);

impl EventId {
    /// Generate a new time-ordered event ID (UUID v7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.short_id())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single clock-in or clock-out, stamped at persistence.
///
/// Created once by the event recorder and immutable thereafter. The
/// serialized form is the persisted record shape:
/// `{id, employeeId, name, action, method, timestamp}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockEvent {
    pub id: EventId,
    pub employee_id: String,
    pub name: String,
    pub action: ClockAction,
    pub method: String,
    pub timestamp: DateTime<Utc>,
}

impl ClockEvent {
    /// Assemble an event for `identity`. The recorder is the only intended
    /// caller; it owns the id and timestamp.
    pub fn new(
        identity: &EmployeeIdentity,
        action: ClockAction,
        method: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            employee_id: identity.employee_id.clone(),
            name: identity.name.clone(),
            action,
            method: method.into(),
            timestamp,
        }
    }

    pub fn identity(&self) -> EmployeeIdentity {
        EmployeeIdentity::new(self.employee_id.clone(), self.name.clone())
    }
}

impl fmt::Display for ClockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} via {} at {}",
            self.employee_id,
            self.name,
            self.action,
            self.method,
            self.timestamp.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClockEvent {
        ClockEvent::new(
            &EmployeeIdentity::new("e1", "John Doe"),
            ClockAction::In,
            DEFAULT_METHOD,
            Utc::now(),
        )
    }

    #[test]
    fn record_shape_is_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["id", "employeeId", "name", "action", "method", "timestamp"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["action"], "in");
        assert_eq!(obj["method"], "RFID");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(EventId::new().short_id().len(), 8);
    }

    #[test]
    fn identity_roundtrips_through_event() {
        let event = sample();
        assert_eq!(event.identity(), EmployeeIdentity::new("e1", "John Doe"));
    }
}
