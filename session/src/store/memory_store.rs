use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use super::{SessionStore, DEFAULT_MAX_IDLE};
use crate::error::{Result, SessionError};
use crate::model::{Session, SessionId};

/// In-process backend: one table-wide reader/writer lock over the
/// key → session map.
///
/// Reads (`exists`, `get`, `session_count`) share the lock; mutations
/// (`add`, `remove`, `clean`, `create_session`) hold it exclusively.
/// Field-level synchronization lives inside [`Session`], not here.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    max_idle: Duration,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// Override the idle threshold used by [`clean`](SessionStore::clean).
    pub fn with_max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = max_idle;
        self
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, user_name: &str, is_admin: bool) -> Result<Session> {
        let session = Session::new(user_name, is_admin);
        self.sessions.write().insert(session.id(), session.clone());

        debug!(session_id = %session.id(), user_name, "session created");
        Ok(session)
    }

    async fn get(&self, key: SessionId) -> Result<Session> {
        self.sessions
            .read()
            .get(&key)
            .cloned()
            .ok_or(SessionError::NotFound(key))
    }

    async fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.read().len())
    }

    async fn add(&self, session: &Session) -> Result<()> {
        self.sessions.write().insert(session.id(), session.clone());
        Ok(())
    }

    async fn remove(&self, key: SessionId) -> Result<()> {
        self.sessions.write().remove(&key);
        Ok(())
    }

    async fn exists(&self, key: SessionId) -> Result<bool> {
        Ok(self.sessions.read().contains_key(&key))
    }

    /// O(n) sweep under the exclusive table lock.
    #[instrument(skip(self), target = "session")]
    async fn clean(&self) -> Result<usize> {
        let now_ms = Utc::now().timestamp_millis();
        let max_idle_ms = self.max_idle.as_millis() as i64;

        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_stale(now_ms, max_idle_ms));
        let evicted = before - sessions.len();

        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "stale sessions evicted");
        }

        Ok(evicted)
    }
}
