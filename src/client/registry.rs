//! Process-wide registry of live sessions.
//!
//! A session is added when it connects and removed when it quits or its
//! transport drops. The binary uses emptiness of the registry, reached after
//! expected disconnects, as the signal to exit.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Notify;

use super::SessionId;

#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub server: String,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<SessionId, SessionEntry>,
    emptied: Notify,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: SessionId, server: &str) {
        self.sessions.insert(
            id,
            SessionEntry {
                server: server.to_string(),
                connected_at: Utc::now(),
            },
        );
    }

    /// Remove a session. Returns false if it was not registered.
    pub fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed && self.sessions.is_empty() {
            self.emptied.notify_waiters();
        }
        removed
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionEntry> {
        self.sessions.get(id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Resolve once no sessions are registered.
    pub async fn wait_empty(&self) {
        loop {
            // Registered before the check so a removal in between is not missed
            let notified = self.emptied.notified();
            if self.is_empty() {
                return;
            }
            notified.await;
        }
    }
}
