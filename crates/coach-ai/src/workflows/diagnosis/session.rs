use super::scoring::AnswerValue;
use crate::workflows::clients::ClientId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Short-lived holding area for in-progress survey answers, keyed by client.
///
/// Entries expire after the configured TTL; an expired or lost session simply
/// means the client redoes the survey. Not crash-safe, and deliberately not a
/// process-global map: the store is owned by the diagnosis service and every
/// access goes through it.
pub struct SessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<ClientId, SessionEntry>>,
}

struct SessionEntry {
    answers: HashMap<String, AnswerValue>,
    expires_at: Instant,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record one answer, opening the session if needed. Every write renews
    /// the session's expiry.
    pub fn record(&self, client: &ClientId, question_id: String, value: AnswerValue) {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("session mutex poisoned");
        entries.retain(|_, entry| entry.expires_at > now);

        let entry = entries.entry(client.clone()).or_insert_with(|| SessionEntry {
            answers: HashMap::new(),
            expires_at: now + self.ttl,
        });
        entry.expires_at = now + self.ttl;
        entry.answers.insert(question_id, value);
    }

    /// Remove and return the client's answers. Missing or expired sessions
    /// yield an empty map so diagnosis completion can still proceed.
    pub fn take(&self, client: &ClientId) -> HashMap<String, AnswerValue> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("session mutex poisoned");
        match entries.remove(client) {
            Some(entry) if entry.expires_at > now => entry.answers,
            _ => HashMap::new(),
        }
    }

    pub fn answered_count(&self, client: &ClientId) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().expect("session mutex poisoned");
        entries
            .get(client)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.answers.len())
            .unwrap_or(0)
    }
}
