use std::any::Any;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use haus_auth::{
    AccessControl, AuthConfig, AuthStore, FixedClock, Session, SessionStore, User, UserDirectory,
    store::{InMemory, StoreError},
};

/// Session lifetime used by [`test_access`].
pub const TEST_TTL_SECS: u64 = 60;

/// Creates a test store based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory store (default)
/// - "sqlite": SQLite in-memory store (requires `sqlite` feature)
///
/// # Panics
/// Panics if TEST_BACKEND=sqlite but the `sqlite` feature is not enabled.
pub async fn test_store() -> Arc<dyn AuthStore> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use haus_auth::store::SqliteStore;
                Arc::new(
                    SqliteStore::in_memory()
                        .await
                        .expect("Failed to create SQLite store"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Arc::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite")
        }
    }
}

/// Config with a short session lifetime.
pub fn test_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.sessions.expiration = TEST_TTL_SECS as f64;
    config
}

/// Creates a SessionStore on a fresh store with a controllable clock.
pub async fn test_sessions() -> (SessionStore, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::default());
    (
        SessionStore::with_clock(test_store().await, clock.clone()),
        clock,
    )
}

/// Creates an AccessControl on a fresh store with a controllable clock.
pub async fn test_access() -> (AccessControl, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::default());
    let access = AccessControl::with_clock(test_store().await, &test_config(), clock.clone());
    (access, clock)
}

/// Creates a user and replaces its scopes.
pub async fn create_user_with_scopes(
    users: &UserDirectory,
    username: &str,
    password: &str,
    scopes: &[&str],
) -> haus_auth::User {
    let user = users
        .create(username, password)
        .await
        .expect("Failed to create user");
    users
        .edit(
            &user.id,
            haus_auth::UserEdit::new().scopes(scopes.iter().copied()),
        )
        .await
        .expect("Failed to set scopes")
}

/// An [`InMemory`] store that injects writes and failures between the
/// caller's reads and writes.
///
/// Each hook fires once.
#[derive(Default)]
pub struct InterferingStore {
    inner: InMemory,
    renew_on_load: Mutex<Option<DateTime<Utc>>>,
    delete_on_user_lookup: Mutex<Option<String>>,
    failing_user_saves: AtomicUsize,
}

impl InterferingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// After the next `load_session` reads its record, store it again with
    /// `expire_at`. The caller still sees the record as read.
    pub fn renew_on_next_load(&self, expire_at: DateTime<Utc>) {
        *self.renew_on_load.lock().unwrap() = Some(expire_at);
    }

    /// Delete `session_id` during the next username lookup.
    pub fn delete_session_on_next_user_lookup(&self, session_id: &str) {
        *self.delete_on_user_lookup.lock().unwrap() = Some(session_id.to_string());
    }

    /// Fail the next `count` user saves with an I/O error.
    pub fn fail_user_saves(&self, count: usize) {
        self.failing_user_saves.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthStore for InterferingStore {
    async fn load_user_by_id(&self, id: &str) -> haus_auth::Result<Option<User>> {
        self.inner.load_user_by_id(id).await
    }

    async fn load_user_by_username(&self, username: &str) -> haus_auth::Result<Option<User>> {
        let pending = self.delete_on_user_lookup.lock().unwrap().take();
        if let Some(session_id) = pending {
            self.inner.delete_session(&session_id).await?;
        }
        self.inner.load_user_by_username(username).await
    }

    async fn save_user(&self, user: &User) -> haus_auth::Result<()> {
        let failing = self
            .failing_user_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::FileIo {
                source: std::io::Error::other("disk full"),
            }
            .into());
        }
        self.inner.save_user(user).await
    }

    async fn delete_user(&self, id: &str) -> haus_auth::Result<bool> {
        self.inner.delete_user(id).await
    }

    async fn list_users(&self) -> haus_auth::Result<Vec<User>> {
        self.inner.list_users().await
    }

    async fn load_session(&self, id: &str) -> haus_auth::Result<Option<Session>> {
        let session = self.inner.load_session(id).await?;
        let pending = self.renew_on_load.lock().unwrap().take();
        if let (Some(expire_at), Some(read)) = (pending, &session) {
            let mut renewed = read.clone();
            renewed.expire_at = expire_at;
            self.inner.save_session(&renewed).await?;
        }
        Ok(session)
    }

    async fn save_session(&self, session: &Session) -> haus_auth::Result<()> {
        self.inner.save_session(session).await
    }

    async fn update_session(&self, session: &Session) -> haus_auth::Result<bool> {
        self.inner.update_session(session).await
    }

    async fn delete_session(&self, id: &str) -> haus_auth::Result<bool> {
        self.inner.delete_session(id).await
    }

    async fn delete_session_if_expired(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> haus_auth::Result<bool> {
        self.inner.delete_session_if_expired(id, now).await
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> haus_auth::Result<usize> {
        self.inner.purge_expired_sessions(now).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
