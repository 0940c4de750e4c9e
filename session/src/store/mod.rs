pub mod cache;
pub mod memory_store;
pub mod redis_store;

use std::time::Duration;

use crate::error::Result;
use crate::model::{Session, SessionId, SessionRecord};

/// Idle threshold after which a sweep considers a session stale.
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(10 * 60);

/// Capability contract every session backend satisfies.
///
/// Backends are interchangeable: the same nine operations, the same error
/// contract, and one shared record codec, so bytes written through one
/// backend decode through the other.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Mint a fresh session for `user_name` and insert it in one step.
    /// The new session starts logged out with an empty payload bag.
    async fn create_session(&self, user_name: &str, is_admin: bool) -> Result<Session>;

    /// Fetch by exact key. An absent key is `SessionError::NotFound`.
    async fn get(&self, key: SessionId) -> Result<Session>;

    /// Number of live sessions held by the backend.
    async fn session_count(&self) -> Result<usize>;

    /// Unconditional upsert keyed by the session id.
    async fn add(&self, session: &Session) -> Result<()>;

    /// Idempotent delete; removing an absent key succeeds.
    async fn remove(&self, key: SessionId) -> Result<()>;

    async fn exists(&self, key: SessionId) -> Result<bool>;

    /// Evict sessions idle longer than the backend's configured threshold.
    /// Returns how many were dropped.
    async fn clean(&self) -> Result<usize>;

    /// Encode a session into its wire record.
    fn to_binary(&self, session: &Session) -> Result<Vec<u8>> {
        session.to_record().to_bytes()
    }

    /// Decode a wire record produced by [`to_binary`](Self::to_binary).
    fn from_binary(&self, bytes: &[u8]) -> Result<Session> {
        Ok(SessionRecord::from_bytes(bytes)?.into())
    }
}
