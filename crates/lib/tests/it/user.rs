//! User directory tests

use std::sync::Arc;

use haus_auth::config::DefaultUserConfig;
use haus_auth::{Error, UserDirectory, UserEdit, UserError};

use crate::helpers::*;

async fn directory() -> UserDirectory {
    UserDirectory::new(test_store().await)
}

#[tokio::test]
async fn test_authenticate_failure_is_uniform() {
    let users = directory().await;
    users.create("alice", "hunter2").await.unwrap();

    let unknown = users.authenticate("nobody", "hunter2").await.unwrap_err();
    let wrong = users.authenticate("alice", "wrong").await.unwrap_err();

    assert!(matches!(unknown, Error::User(UserError::InvalidCredentials)));
    assert!(matches!(wrong, Error::User(UserError::InvalidCredentials)));
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert!(unknown.is_authentication_error());
    assert!(!unknown.is_not_found());
}

#[tokio::test]
async fn test_new_user_has_no_scopes_and_redacts() {
    let users = directory().await;
    let user = users.create("alice", "hunter2").await.unwrap();
    assert!(user.scopes.is_empty());
    assert!(!users.authorize(&user, "app"));

    let redacted = users.redact(&user);
    assert_eq!(redacted.username, "alice");
    let json = serde_json::to_value(&redacted).unwrap();
    assert!(json.get("password_hash").is_none());
    assert!(json.get("password_salt").is_none());
}

#[tokio::test]
async fn test_authorize_follows_hierarchy() {
    let users = directory().await;
    let user =
        create_user_with_scopes(&users, "alice", "pw", &["app", "users.manage"]).await;

    assert!(users.authorize(&user, "users.manage.delete"));
    assert!(!users.authorize(&user, "users.view"));
    assert!(!users.authorize(&user, "users"));
}

#[tokio::test]
async fn test_list_is_redacted_and_sorted() {
    let users = directory().await;
    users.create("carol", "c").await.unwrap();
    users.create("alice", "a").await.unwrap();
    users.create("bob", "b").await.unwrap();

    let names: Vec<String> = users
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_edit_profile_fields() {
    let users = directory().await;
    let user = users.create("alice", "pw").await.unwrap();

    let edited = users
        .edit(
            &user.id,
            UserEdit::new()
                .display_name(Some("Alice".to_string()))
                .user_icon(Some("cat.png".to_string())),
        )
        .await
        .unwrap();
    assert_eq!(edited.display_name.as_deref(), Some("Alice"));

    let loaded = users.get(&user.id).await.unwrap().unwrap();
    assert_eq!(loaded.user_icon.as_deref(), Some("cat.png"));
    // Credentials survive a profile edit
    assert!(users.authenticate("alice", "pw").await.is_ok());
}

#[tokio::test]
async fn test_rename_then_login_with_new_name() {
    let users = directory().await;
    let user = users.create("alice", "pw").await.unwrap();
    users
        .edit(&user.id, UserEdit::new().username("alicia"))
        .await
        .unwrap();

    assert!(users.get_by_username("alice").await.unwrap().is_none());
    assert!(users.authenticate("alicia", "pw").await.is_ok());
}

#[tokio::test]
async fn test_edit_unknown_user() {
    let users = directory().await;
    let err = users
        .edit("missing", UserEdit::new().username("x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_default_user_bootstrap() {
    let users = directory().await;
    let config = DefaultUserConfig {
        username: "admin".to_string(),
        password: "admin-pw".to_string(),
        create_if_not_present: true,
    };

    let admin = users.ensure_default_user(&config).await.unwrap().unwrap();
    assert_eq!(admin.scopes, vec!["root"]);
    assert!(users.authorize(&admin, "server.manage.colors"));

    let authed = users.authenticate("admin", "admin-pw").await.unwrap();
    assert_eq!(authed.id, admin.id);

    assert!(users.ensure_default_user(&config).await.unwrap().is_none());
    assert!(users.delete(&admin.id).await.unwrap_err().is_permission_denied());
}

#[tokio::test]
async fn test_failed_bootstrap_save_leaves_nothing_behind() {
    let store = Arc::new(InterferingStore::new());
    let users = UserDirectory::new(store.clone());
    let config = DefaultUserConfig {
        username: "admin".to_string(),
        password: "admin-pw".to_string(),
        create_if_not_present: true,
    };

    store.fail_user_saves(1);
    let err = users.ensure_default_user(&config).await.unwrap_err();
    assert!(err.is_io_error());
    assert!(users.get_by_username("admin").await.unwrap().is_none());

    // The retry still creates a root account
    let admin = users.ensure_default_user(&config).await.unwrap().unwrap();
    assert_eq!(admin.scopes, vec!["root"]);
    assert!(users.authenticate("admin", "admin-pw").await.is_ok());
}

#[tokio::test]
async fn test_failed_create_with_leaves_nothing_behind() {
    let store = Arc::new(InterferingStore::new());
    let users = UserDirectory::new(store.clone());
    let edit = UserEdit::new()
        .display_name(Some("Alice".to_string()))
        .scopes(["app"]);

    store.fail_user_saves(1);
    assert!(users.create_with("alice", "pw", edit.clone()).await.is_err());
    assert!(users.list().await.unwrap().is_empty());

    let alice = users.create_with("alice", "pw", edit).await.unwrap();
    assert_eq!(alice.display_name.as_deref(), Some("Alice"));
    assert_eq!(alice.scopes, vec!["app"]);
}
