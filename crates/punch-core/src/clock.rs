use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Server-side timestamp source for recorded events.
///
/// Follows the wall clock but never goes backwards: if the wall clock steps
/// back, the last issued timestamp is reused until it catches up.
pub struct RecordClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl RecordClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// A clock that will never issue a timestamp earlier than `floor`.
    pub fn resume_after(floor: DateTime<Utc>) -> Self {
        Self {
            last: Mutex::new(Some(floor)),
        }
    }

    /// Issue the next timestamp.
    pub fn now(&self) -> DateTime<Utc> {
        self.stamp(Utc::now())
    }

    fn stamp(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let mut last = self.last.lock().expect("record clock mutex poisoned");
        let next = match *last {
            Some(prev) if prev > wall => prev,
            _ => wall,
        };
        *last = Some(next);
        next
    }
}

impl Default for RecordClock {
    fn default() -> Self {
        Self::new()
    }
}
