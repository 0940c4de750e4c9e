use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub type SessionId = uuid::Uuid;

/// Mutable session state, guarded by the per-session lock.
#[derive(Debug)]
struct SessionFields {
    user_name: String,
    last_seen_ms: i64,
    is_admin: bool,
    is_logged: bool,
    data: HashMap<String, Value>,
}

/// A per-user session handle.
///
/// Cloning a `Session` clones the handle, not the record: every clone shares
/// one lock and one set of fields, so a mutation through any clone is visible
/// through all of them. The key is immutable and readable without locking.
///
/// Each accessor/mutator takes the lock for the duration of that single
/// operation only; no method holds it across multiple field accesses and
/// none performs I/O.
#[derive(Debug, Clone)]
pub struct Session {
    key: SessionId,
    fields: Arc<RwLock<SessionFields>>,
}

impl Session {
    /// Mint a fresh session: random v4 key, `last_seen` = now, logged out,
    /// empty payload bag.
    pub fn new(user_name: impl Into<String>, is_admin: bool) -> Self {
        Self {
            key: SessionId::new_v4(),
            fields: Arc::new(RwLock::new(SessionFields {
                user_name: user_name.into(),
                last_seen_ms: Utc::now().timestamp_millis(),
                is_admin,
                is_logged: false,
                data: HashMap::new(),
            })),
        }
    }

    pub fn id(&self) -> SessionId {
        self.key
    }

    /// Record a liveness touch.
    pub fn touch(&self) {
        self.fields.write().last_seen_ms = Utc::now().timestamp_millis();
    }

    pub fn last_seen_ms(&self) -> i64 {
        self.fields.read().last_seen_ms
    }

    /// Returns true if the session has been idle longer than `max_idle_ms`
    /// as of `now_ms`.
    pub fn is_stale(&self, now_ms: i64, max_idle_ms: i64) -> bool {
        now_ms - self.last_seen_ms() > max_idle_ms
    }

    pub fn user_name(&self) -> String {
        self.fields.read().user_name.clone()
    }

    pub fn set_user_name(&self, user_name: impl Into<String>) {
        self.fields.write().user_name = user_name.into();
    }

    pub fn is_admin(&self) -> bool {
        self.fields.read().is_admin
    }

    pub fn set_admin(&self, is_admin: bool) {
        self.fields.write().is_admin = is_admin;
    }

    pub fn is_logged(&self) -> bool {
        self.fields.read().is_logged
    }

    pub fn set_login(&self, is_logged: bool) {
        self.fields.write().is_logged = is_logged;
    }

    /// Fetch a payload entry. An absent key is `None`, never an error.
    pub fn data(&self, key: &str) -> Option<Value> {
        self.fields.read().data.get(key).cloned()
    }

    pub fn set_data(&self, key: impl Into<String>, value: Value) {
        self.fields.write().data.insert(key.into(), value);
    }

    /// Flatten into the wire record. Lossless except for the lock itself,
    /// which has no serializable state.
    pub fn to_record(&self) -> SessionRecord {
        let fields = self.fields.read();
        SessionRecord {
            key: self.key,
            user_name: fields.user_name.clone(),
            last_seen_ms: fields.last_seen_ms,
            is_admin: fields.is_admin,
            is_logged: fields.is_logged,
            data: fields.data.clone(),
        }
    }
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            key: record.key,
            fields: Arc::new(RwLock::new(SessionFields {
                user_name: record.user_name,
                last_seen_ms: record.last_seen_ms,
                is_admin: record.is_admin,
                is_logged: record.is_logged,
                data: record.data,
            })),
        }
    }
}

/// Flattened wire form of a session.
///
/// Serialized as a self-describing record for the network-backed store and
/// the `to_binary`/`from_binary` surface. Same-version round-trip only; the
/// encoding carries no schema version field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub key: SessionId,
    pub user_name: String,
    pub last_seen_ms: i64,
    pub is_admin: bool,
    pub is_logged: bool,
    pub data: HashMap<String, Value>,
}

impl SessionRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
