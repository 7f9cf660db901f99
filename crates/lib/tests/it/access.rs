//! Login and scope gating tests

use std::sync::Arc;

use haus_auth::{AccessControl, AuthStore, Clock, Error, FixedClock, SessionError, UserError};

use crate::helpers::*;

#[tokio::test]
async fn test_login_binds_and_renews() {
    let (access, clock) = test_access().await;
    create_user_with_scopes(access.users(), "alice", "pw", &["app"]).await;

    let session = access.open_session().await.unwrap();
    clock.advance_secs(TEST_TTL_SECS - 1);

    let redacted = access.login(&session.id, "alice", "pw").await.unwrap();
    assert_eq!(redacted.username, "alice");

    // Renewed at login, so the original deadline no longer applies
    clock.advance_secs(TEST_TTL_SECS - 1);
    let principal = access.principal(&session.id).await.unwrap().unwrap();
    assert_eq!(principal.id, redacted.id);

    clock.advance_secs(1);
    assert!(access.principal(&session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_on_expired_session() {
    let (access, clock) = test_access().await;
    create_user_with_scopes(access.users(), "alice", "pw", &["app"]).await;

    let session = access.open_session().await.unwrap();
    clock.advance_secs(TEST_TTL_SECS);

    let err = access.login(&session.id, "alice", "pw").await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::SessionNotFound)));
}

#[tokio::test]
async fn test_login_failures_leave_session_anonymous() {
    let (access, clock) = test_access().await;
    create_user_with_scopes(access.users(), "alice", "pw", &["app"]).await;
    let session = access.open_session().await.unwrap();

    let err = access.login(&session.id, "alice", "nope").await.unwrap_err();
    assert!(matches!(err, Error::User(UserError::InvalidCredentials)));
    let err = access.login(&session.id, "bob", "pw").await.unwrap_err();
    assert!(matches!(err, Error::User(UserError::InvalidCredentials)));

    let stored = access.resolve_session(&session.id).await.unwrap().unwrap();
    assert!(!stored.is_bound());
    assert!(stored.expire_at > clock.now_utc());
}

#[tokio::test]
async fn test_account_without_app_scope_is_disabled() {
    let (access, _) = test_access().await;
    create_user_with_scopes(access.users(), "alice", "pw", &["users.view"]).await;
    let session = access.open_session().await.unwrap();

    let err = access.login(&session.id, "alice", "pw").await.unwrap_err();
    assert!(matches!(err, Error::User(UserError::AccountDisabled)));

    // A wrong password on a disabled account still looks like any other failure
    let err = access.login(&session.id, "alice", "nope").await.unwrap_err();
    assert!(matches!(err, Error::User(UserError::InvalidCredentials)));
}

#[tokio::test]
async fn test_root_user_can_log_in_without_app() {
    let (access, _) = test_access().await;
    create_user_with_scopes(access.users(), "admin", "pw", &["root"]).await;
    let session = access.open_session().await.unwrap();

    access.login(&session.id, "admin", "pw").await.unwrap();
    let user = access
        .require_scope(&session.id, "server.manage.zones")
        .await
        .unwrap();
    assert!(user.is_root());
}

#[tokio::test]
async fn test_require_scope() {
    let (access, _) = test_access().await;
    create_user_with_scopes(access.users(), "alice", "pw", &["app", "plugins.manage"]).await;

    let session = access.open_session().await.unwrap();
    let err = access
        .require_scope(&session.id, "plugins.view")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::User(UserError::NotAuthenticated)));

    access.login(&session.id, "alice", "pw").await.unwrap();
    access
        .require_scope(&session.id, "plugins.manage.active")
        .await
        .unwrap();

    let err = access
        .require_scope(&session.id, "plugins.view")
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(matches!(
        err,
        Error::User(UserError::MissingScope { ref scope }) if scope == "plugins.view"
    ));
}

#[tokio::test]
async fn test_deleted_user_orphans_session() {
    let (access, _) = test_access().await;
    let alice = create_user_with_scopes(access.users(), "alice", "pw", &["app"]).await;
    let session = access.open_session().await.unwrap();
    access.login(&session.id, "alice", "pw").await.unwrap();

    access.users().delete(&alice.id).await.unwrap();

    // The session itself survives but no longer yields a principal
    assert!(access.resolve_session(&session.id).await.unwrap().is_some());
    assert!(access.principal(&session.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout() {
    let (access, _) = test_access().await;
    create_user_with_scopes(access.users(), "alice", "pw", &["app"]).await;
    let session = access.open_session().await.unwrap();
    access.login(&session.id, "alice", "pw").await.unwrap();

    assert!(access.logout(&session.id).await.unwrap());
    assert!(access.principal(&session.id).await.unwrap().is_none());
    assert!(!access.logout(&session.id).await.unwrap());
}

#[tokio::test]
async fn test_contract_level_session_operations() {
    let (access, clock) = test_access().await;
    let alice = create_user_with_scopes(access.users(), "alice", "pw", &["app"]).await;

    let mut session = access
        .create_session(std::time::Duration::from_secs(10))
        .await
        .unwrap();
    access.bind_session(&mut session, &alice.id).await.unwrap();
    clock.advance_secs(5);
    access
        .renew_session(&mut session, std::time::Duration::from_secs(10))
        .await
        .unwrap();
    clock.advance_secs(9);

    let resolved = access.resolve_session(&session.id).await.unwrap().unwrap();
    assert_eq!(resolved.user_id.as_deref(), Some(alice.id.as_str()));

    let user = access.authenticate("alice", "pw").await.unwrap();
    assert!(access.authorize(&user, "app.kiosk"));
    assert_eq!(access.redact_user(&user).id, alice.id);
}

#[tokio::test]
async fn test_logout_during_login_is_final() {
    let store = Arc::new(InterferingStore::new());
    let access = AccessControl::with_clock(
        store.clone(),
        &test_config(),
        Arc::new(FixedClock::default()),
    );
    create_user_with_scopes(access.users(), "alice", "pw", &["app"]).await;
    let session = access.open_session().await.unwrap();

    store.delete_session_on_next_user_lookup(&session.id);
    let err = access.login(&session.id, "alice", "pw").await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::SessionNotFound)));

    assert!(access.principal(&session.id).await.unwrap().is_none());
    assert!(store.load_session(&session.id).await.unwrap().is_none());
}
