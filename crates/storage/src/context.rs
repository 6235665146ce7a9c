use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use wayfarer_core::SuggestedAction;

/// Sessions untouched for this long are forgotten.
pub(crate) const SESSION_IDLE_HOURS: i64 = 24;

const SWEEP_INTERVAL_SECS: i64 = 60;

/// Per-session values keyed by the client-supplied session id. Entries idle
/// past `idle_ttl` are swept on write, at most once per sweep interval.
pub(crate) struct IdleSlots<V> {
    entries: HashMap<String, (V, DateTime<Utc>)>,
    idle_ttl: Duration,
    last_sweep: Option<DateTime<Utc>>,
}

impl<V> IdleSlots<V> {
    pub(crate) fn new(idle_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            idle_ttl,
            last_sweep: None,
        }
    }

    pub(crate) fn get(&self, session_id: &str, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(session_id)
            .filter(|(_, touched_at)| now - *touched_at < self.idle_ttl)
            .map(|(value, _)| value)
    }

    pub(crate) fn insert(&mut self, session_id: &str, value: V, now: DateTime<Utc>) {
        self.sweep(now);
        self.entries.insert(session_id.to_string(), (value, now));
    }

    pub(crate) fn remove(&mut self, session_id: &str) -> Option<V> {
        self.entries.remove(session_id).map(|(value, _)| value)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn sweep(&mut self, now: DateTime<Utc>) {
        if let Some(last_sweep) = self.last_sweep {
            if now - last_sweep < Duration::seconds(SWEEP_INTERVAL_SECS) {
                return;
            }
        }
        let idle_ttl = self.idle_ttl;
        self.entries
            .retain(|_, (_, touched_at)| now - *touched_at < idle_ttl);
        self.last_sweep = Some(now);
    }
}

/// Per-session "last suggested action". Lost on restart.
///
/// Concurrent requests for one session are last-write-wins: every write
/// replaces the slot whole under the lock.
#[derive(Clone)]
pub struct SessionContexts {
    slots: Arc<RwLock<IdleSlots<SuggestedAction>>>,
}

impl Default for SessionContexts {
    fn default() -> Self {
        Self {
            slots: Arc::new(RwLock::new(IdleSlots::new(Duration::hours(
                SESSION_IDLE_HOURS,
            )))),
        }
    }
}

impl SessionContexts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Option<SuggestedAction> {
        self.slots.read().get(session_id, Utc::now()).cloned()
    }

    pub fn set(&self, session_id: &str, action: SuggestedAction) {
        self.slots.write().insert(session_id, action, Utc::now());
    }

    pub fn clear(&self, session_id: &str) {
        self.slots.write().remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
