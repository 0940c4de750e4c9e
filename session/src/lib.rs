//! Per-user session records behind interchangeable storage backends.
//!
//! Two backends implement the same [`SessionStore`](store::SessionStore)
//! contract: an in-process table ([`MemorySessionStore`]) and a network-backed
//! store ([`RedisSessionStore`]) that round-trips sessions through the
//! [`SessionRecord`] binary codec on every read and write.

pub mod error;
pub mod model;
pub mod store;

pub use error::{Result, SessionError};
pub use model::{Session, SessionId, SessionRecord};
pub use store::memory_store::MemorySessionStore;
pub use store::redis_store::RedisSessionStore;
