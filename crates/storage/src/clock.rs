use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::context::{IdleSlots, SESSION_IDLE_HOURS};

/// Hands out conversation-log timestamps that strictly increase per session,
/// so concurrent requests on one session never share a `(session_id, timestamp)` key.
#[derive(Clone)]
pub struct TurnClock {
    last_issued: Arc<Mutex<IdleSlots<i64>>>,
}

impl Default for TurnClock {
    fn default() -> Self {
        Self {
            last_issued: Arc::new(Mutex::new(IdleSlots::new(Duration::hours(
                SESSION_IDLE_HOURS,
            )))),
        }
    }
}

impl TurnClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stamp(&self, session_id: &str) -> DateTime<Utc> {
        self.stamp_at(session_id, Utc::now())
    }

    /// `at`, or one millisecond past the last stamp issued for the session.
    pub fn stamp_at(&self, session_id: &str, at: DateTime<Utc>) -> DateTime<Utc> {
        let mut last_issued = self.last_issued.lock();
        let millis = match last_issued.get(session_id, at) {
            Some(&last) => at.timestamp_millis().max(last + 1),
            None => at.timestamp_millis(),
        };
        last_issued.insert(session_id, millis, at);
        DateTime::from_timestamp_millis(millis).unwrap_or(at)
    }
}
