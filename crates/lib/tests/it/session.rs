//! Session lifecycle tests

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use haus_auth::{AuthStore, Clock, FixedClock, SessionState, SessionStore};

use crate::helpers::*;

#[tokio::test]
async fn test_lifecycle_anonymous_bound_expired() {
    let (sessions, clock) = test_sessions().await;
    let mut session = sessions.create(Duration::from_secs(30)).await.unwrap();

    let resolved = sessions.resolve(&session.id).await.unwrap().unwrap();
    assert_eq!(resolved.state(clock.now_utc()), SessionState::Anonymous);

    sessions.bind(&mut session, "user-1").await.unwrap();
    let resolved = sessions.resolve(&session.id).await.unwrap().unwrap();
    assert_eq!(resolved.state(clock.now_utc()), SessionState::Bound);

    clock.advance_secs(30);
    assert!(sessions.resolve(&session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_renew_extends_from_renewal_instant() {
    let (sessions, clock) = test_sessions().await;
    let mut session = sessions.create(Duration::from_secs(30)).await.unwrap();

    clock.advance_secs(20);
    sessions
        .renew(&mut session, Duration::from_secs(30))
        .await
        .unwrap();

    clock.advance_secs(29);
    assert!(sessions.resolve(&session.id).await.unwrap().is_some());
    clock.advance_secs(1);
    assert!(sessions.resolve(&session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_renew_can_shorten() {
    let (sessions, clock) = test_sessions().await;
    let mut session = sessions.create(Duration::from_secs(300)).await.unwrap();
    sessions
        .renew(&mut session, Duration::from_secs(5))
        .await
        .unwrap();

    clock.advance_secs(5);
    assert!(sessions.resolve(&session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_session_resolves_to_none() {
    let (sessions, _) = test_sessions().await;
    assert!(sessions.resolve("no-such-session").await.unwrap().is_none());
    assert!(!sessions.end("no-such-session").await.unwrap());
}

#[tokio::test]
async fn test_purge_expired() {
    let (sessions, clock) = test_sessions().await;
    let short = sessions.create(Duration::from_secs(5)).await.unwrap();
    let long = sessions.create(Duration::from_secs(50)).await.unwrap();

    clock.advance_secs(10);
    assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    assert!(sessions.resolve(&short.id).await.unwrap().is_none());
    assert!(sessions.resolve(&long.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_resolve_keeps_a_concurrently_renewed_session() {
    let store = Arc::new(InterferingStore::new());
    let clock = Arc::new(FixedClock::default());
    let sessions = SessionStore::with_clock(store.clone(), clock.clone());
    let session = sessions.create(Duration::from_secs(30)).await.unwrap();

    clock.advance_secs(30);
    let renewed_until = clock.now_utc() + TimeDelta::seconds(60);
    store.renew_on_next_load(renewed_until);

    // The read saw the expired record, the renewal landed after it
    assert!(sessions.resolve(&session.id).await.unwrap().is_none());

    let resolved = sessions.resolve(&session.id).await.unwrap().unwrap();
    assert_eq!(resolved.expire_at, renewed_until);
}

#[tokio::test]
async fn test_resolve_removes_an_expired_record() {
    let store = Arc::new(InterferingStore::new());
    let clock = Arc::new(FixedClock::default());
    let sessions = SessionStore::with_clock(store.clone(), clock.clone());
    let session = sessions.create(Duration::from_secs(30)).await.unwrap();

    clock.advance_secs(30);
    assert!(sessions.resolve(&session.id).await.unwrap().is_none());
    assert!(store.load_session(&session.id).await.unwrap().is_none());
}
