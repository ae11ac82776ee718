//! Pending location codes awaiting a site choice, keyed by Slack user id.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
struct PendingLocation {
    code: String,
    created_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, PendingLocation>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records `code` as the user's pending location, replacing any earlier one.
    pub fn begin(&self, user_id: &str, code: &str) {
        let mut entries = self.lock();
        self.prune(&mut entries);
        entries.insert(
            user_id.to_string(),
            PendingLocation {
                code: code.to_string(),
                created_at: Instant::now(),
            },
        );
    }

    /// Removes and returns the user's pending code if it has not expired.
    pub fn take(&self, user_id: &str) -> Option<String> {
        let mut entries = self.lock();
        self.prune(&mut entries);
        entries.remove(user_id).map(|pending| pending.code)
    }

    #[must_use]
    pub fn is_pending(&self, user_id: &str) -> bool {
        let mut entries = self.lock();
        self.prune(&mut entries);
        entries.contains_key(user_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let mut entries = self.lock();
        self.prune(&mut entries);
        entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingLocation>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune(&self, entries: &mut HashMap<String, PendingLocation>) {
        let before = entries.len();
        entries.retain(|_, pending| pending.created_at.elapsed() < self.ttl);
        let expired = before - entries.len();
        if expired > 0 {
            debug!(expired, "Dropped expired pending locations");
        }
    }
}
