use std::collections::HashSet;
use std::time::Duration;

use tokio::test;
use uuid::Uuid;

use session::error::SessionError;
use session::model::Session;
use session::store::memory_store::MemorySessionStore;
use session::store::SessionStore;

fn init() -> MemorySessionStore {
    common::logger::init_logger("session-tests");
    MemorySessionStore::new()
}

/// Rebuild a session whose last touch lies `idle` in the past.
fn aged_session(user_name: &str, idle: Duration) -> Session {
    let mut record = Session::new(user_name, false).to_record();
    record.last_seen_ms -= idle.as_millis() as i64;
    Session::from(record)
}

#[test]
async fn create_then_get_returns_matching_session() -> anyhow::Result<()> {
    let store = init();

    let created = store.create_session("alice", false).await?;
    let fetched = store.get(created.id()).await?;

    assert_eq!(fetched.id(), created.id());
    assert_eq!(fetched.user_name(), "alice");
    assert!(!fetched.is_admin());
    assert!(!fetched.is_logged());

    Ok(())
}

#[test]
async fn create_session_honors_admin_flag() -> anyhow::Result<()> {
    let store = init();

    let admin = store.create_session("root", true).await?;
    assert!(store.get(admin.id()).await?.is_admin());

    Ok(())
}

#[test]
async fn created_keys_are_distinct() -> anyhow::Result<()> {
    let store = init();

    let mut keys = HashSet::new();
    for _ in 0..100 {
        let s = store.create_session("bob", false).await?;
        assert!(keys.insert(s.id()), "duplicate session key minted");
    }

    assert_eq!(store.session_count().await?, 100);

    Ok(())
}

#[test]
async fn get_missing_key_is_not_found() {
    let store = init();
    let key = Uuid::new_v4();

    match store.get(key).await {
        Err(SessionError::NotFound(k)) => assert_eq!(k, key),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
async fn remove_then_exists_is_false_and_remove_is_idempotent() -> anyhow::Result<()> {
    let store = init();
    let s = store.create_session("carol", true).await?;

    store.remove(s.id()).await?;

    assert!(!store.exists(s.id()).await?);
    assert!(matches!(
        store.get(s.id()).await,
        Err(SessionError::NotFound(_))
    ));

    // Removing again, and removing a key that never existed, both succeed.
    store.remove(s.id()).await?;
    store.remove(Uuid::new_v4()).await?;

    Ok(())
}

#[test]
async fn add_is_an_upsert() -> anyhow::Result<()> {
    let store = init();
    let s = store.create_session("dave", false).await?;

    s.set_user_name("dave-renamed");
    s.set_login(true);
    store.add(&s).await?;

    assert_eq!(store.session_count().await?, 1);

    let fetched = store.get(s.id()).await?;
    assert_eq!(fetched.user_name(), "dave-renamed");
    assert!(fetched.is_logged());

    Ok(())
}

#[test]
async fn clean_evicts_only_sessions_past_the_idle_threshold() -> anyhow::Result<()> {
    let store = init();

    let stale = aged_session("stale", Duration::from_secs(11 * 60));
    let fresh = aged_session("fresh", Duration::from_secs(60));
    store.add(&stale).await?;
    store.add(&fresh).await?;

    let evicted = store.clean().await?;

    assert_eq!(evicted, 1);
    assert!(!store.exists(stale.id()).await?);
    assert!(store.exists(fresh.id()).await?);
    assert_eq!(store.session_count().await?, 1);

    Ok(())
}

#[test]
async fn clean_honors_configured_max_idle() -> anyhow::Result<()> {
    let store = MemorySessionStore::new().with_max_idle(Duration::from_secs(30));

    let idle_1m = aged_session("idle", Duration::from_secs(60));
    store.add(&idle_1m).await?;
    store.create_session("active", false).await?;

    assert_eq!(store.clean().await?, 1);
    assert_eq!(store.session_count().await?, 1);

    Ok(())
}

#[test]
async fn binary_round_trip_through_the_store_surface() -> anyhow::Result<()> {
    let store = init();
    let s = store.create_session("eve", true).await?;
    s.set_data("locale", serde_json::json!("en-US"));

    let bytes = store.to_binary(&s)?;
    let back = store.from_binary(&bytes)?;

    assert_eq!(back.id(), s.id());
    assert_eq!(back.user_name(), "eve");
    assert_eq!(back.last_seen_ms(), s.last_seen_ms());
    assert!(back.is_admin());
    assert_eq!(back.data("locale"), Some(serde_json::json!("en-US")));

    Ok(())
}
