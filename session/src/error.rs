use thiserror::Error;

use crate::model::SessionId;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Lookup on a key no backend holds.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// A stored record failed to encode or decode. Recoverable: only the
    /// record in question is affected, never the whole store.
    #[error("session record corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote cache could not be reached or rejected the command.
    /// Distinct from [`Serialization`](Self::Serialization) so callers can
    /// retry transient failures only.
    #[error("session backend unavailable: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::Backend(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
