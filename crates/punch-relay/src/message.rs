use std::sync::Arc;

use punch_types::{ClockAction, ClockEvent};
use serde::{Deserialize, Serialize};

/// The payload pushed to kiosk displays for one clock event.
///
/// Carries only what a display renders; ids and timestamps stay in the
/// persisted record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessage {
    pub employee_id: String,
    pub name: String,
    pub action: ClockAction,
}

impl BroadcastMessage {
    /// Serialize to the single JSON frame written to every subscriber.
    pub fn to_frame(&self) -> serde_json::Result<Arc<str>> {
        serde_json::to_string(self).map(Arc::from)
    }
}

impl From<&ClockEvent> for BroadcastMessage {
    fn from(event: &ClockEvent) -> Self {
        Self {
            employee_id: event.employee_id.clone(),
            name: event.name.clone(),
            action: event.action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use punch_types::{EmployeeIdentity, DEFAULT_METHOD};

    #[test]
    fn frame_carries_display_fields_only() {
        let event = ClockEvent::new(
            &EmployeeIdentity::new("e1", "John Doe"),
            ClockAction::In,
            DEFAULT_METHOD,
            Utc::now(),
        );
        let frame = BroadcastMessage::from(&event).to_frame().unwrap();
        assert_eq!(
            &*frame,
            r#"{"employeeId":"e1","name":"John Doe","action":"in"}"#
        );
    }
}
