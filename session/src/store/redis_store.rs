use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::cache::CacheClient;
use super::{SessionStore, DEFAULT_MAX_IDLE};
use crate::error::{Result, SessionError};
use crate::model::{Session, SessionId, SessionRecord};

/// Network-backed store delegating every table operation to a key-value
/// cache.
///
/// Cache keys are the hyphenated session id; values are the binary session
/// record, written with no expiry. The store assumes it owns a dedicated
/// logical database, so `DBSIZE` counts exactly the sessions and a sweep may
/// enumerate every key.
///
/// There is no local lock: concurrency correctness is the cache's per-key
/// atomicity, and a concurrent `add` on the same key is last-writer-wins.
pub struct RedisSessionStore<C> {
    cache: C,
    max_idle: Duration,
}

impl<C: CacheClient> RedisSessionStore<C> {
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// Override the idle threshold used by [`clean`](SessionStore::clean).
    pub fn with_max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = max_idle;
        self
    }
}

impl RedisSessionStore<ConnectionManager> {
    /// Connect to a Redis instance, e.g. `redis://127.0.0.1:6379/2`.
    ///
    /// Point the URL at a database dedicated to sessions; the store counts
    /// and sweeps every key in it.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::new(manager))
    }
}

#[async_trait]
impl<C: CacheClient> SessionStore for RedisSessionStore<C> {
    async fn create_session(&self, user_name: &str, is_admin: bool) -> Result<Session> {
        let session = Session::new(user_name, is_admin);
        self.add(&session).await?;

        debug!(session_id = %session.id(), user_name, "session created");
        Ok(session)
    }

    async fn get(&self, key: SessionId) -> Result<Session> {
        match self.cache.get(&key.to_string()).await? {
            Some(bytes) => self.from_binary(&bytes),
            None => Err(SessionError::NotFound(key)),
        }
    }

    async fn session_count(&self) -> Result<usize> {
        self.cache.db_size().await
    }

    async fn add(&self, session: &Session) -> Result<()> {
        let bytes = self.to_binary(session)?;
        self.cache.set(&session.id().to_string(), bytes).await
    }

    async fn remove(&self, key: SessionId) -> Result<()> {
        self.cache.del(&key.to_string()).await
    }

    async fn exists(&self, key: SessionId) -> Result<bool> {
        self.cache.exists(&key.to_string()).await
    }

    /// Selective sweep: decode every record and delete the stale ones.
    /// Records that no longer decode are dropped as well, so one corrupt
    /// entry cannot wedge the sweep.
    #[instrument(skip(self), target = "session")]
    async fn clean(&self) -> Result<usize> {
        let now_ms = Utc::now().timestamp_millis();
        let max_idle_ms = self.max_idle.as_millis() as i64;

        let mut evicted = 0usize;
        for key in self.cache.scan_keys().await? {
            // A record removed between SCAN and GET is someone else's delete.
            let Some(bytes) = self.cache.get(&key).await? else {
                continue;
            };

            match SessionRecord::from_bytes(&bytes) {
                Ok(record) if now_ms - record.last_seen_ms > max_idle_ms => {
                    self.cache.del(&key).await?;
                    evicted += 1;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(key = %key, %err, "dropping undecodable session record");
                    self.cache.del(&key).await?;
                    evicted += 1;
                }
            }
        }

        if evicted > 0 {
            info!(evicted, "stale sessions evicted from cache");
        }

        Ok(evicted)
    }
}
