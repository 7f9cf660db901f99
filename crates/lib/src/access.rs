//! Login, principal lookup and scope gating over one store.
//!
//! [`AccessControl`] is the entry point a request layer talks to. It wires a
//! [`UserDirectory`] and a [`SessionStore`] over a shared
//! [`AuthStore`] and applies the configured session lifetime.
//!
//! ```no_run
//! # async fn run() -> haus_auth::Result<()> {
//! use std::sync::Arc;
//! use haus_auth::{AccessControl, AuthConfig, store::InMemory};
//!
//! let access = AccessControl::new(Arc::new(InMemory::new()), &AuthConfig::default());
//! let session = access.open_session().await?;
//! access.login(&session.id, "admin", "secret").await?;
//! let user = access.require_scope(&session.id, "users.manage.edit").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::Result;
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::constants::APP_SCOPE;
use crate::session::{Session, SessionError, SessionStore};
use crate::store::AuthStore;
use crate::user::{RedactedUser, User, UserDirectory, UserError};

#[derive(Clone, Debug)]
pub struct AccessControl {
    users: UserDirectory,
    sessions: SessionStore,
    session_ttl: Duration,
}

impl AccessControl {
    pub fn new(store: Arc<dyn AuthStore>, config: &AuthConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn AuthStore>,
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: UserDirectory::new(store.clone()),
            sessions: SessionStore::with_clock(store, clock),
            session_ttl: config.session_ttl(),
        }
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Start an anonymous session with the configured lifetime.
    pub async fn open_session(&self) -> Result<Session> {
        self.sessions.create(self.session_ttl).await
    }

    /// Authenticate and bind the user to a live session.
    ///
    /// The session is renewed with the configured lifetime on success.
    ///
    /// # Errors
    /// - [`SessionError::SessionNotFound`] if the session is unknown, expired,
    ///   or ended before the login completes
    /// - [`UserError::InvalidCredentials`] for an unknown user or wrong password
    /// - [`UserError::AccountDisabled`] if the password matched but the user
    ///   lacks the `app` scope
    pub async fn login(
        &self,
        session_id: &str,
        username: &str,
        password: &str,
    ) -> Result<RedactedUser> {
        let mut session = self
            .sessions
            .resolve(session_id)
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        let user = self.users.authenticate(username, password).await?;
        if !self.users.authorize(&user, APP_SCOPE) {
            tracing::warn!(user_id = %user.id, "Login rejected: account lacks the app scope");
            return Err(UserError::AccountDisabled.into());
        }

        self.sessions.bind(&mut session, user.id.clone()).await?;
        self.sessions.renew(&mut session, self.session_ttl).await?;
        tracing::debug!(user_id = %user.id, "Login succeeded");
        Ok(self.users.redact(&user))
    }

    /// The user bound to a live session, if any.
    ///
    /// Anonymous, expired and unknown sessions, and sessions whose user has
    /// since been deleted, all yield `None`.
    pub async fn principal(&self, session_id: &str) -> Result<Option<User>> {
        let Some(session) = self.sessions.resolve(session_id).await? else {
            return Ok(None);
        };
        let Some(user_id) = session.user_id else {
            return Ok(None);
        };
        self.users.get(&user_id).await
    }

    /// The session's user, provided it holds `scope` or an ancestor of it.
    pub async fn require_scope(&self, session_id: &str, scope: &str) -> Result<User> {
        let user = self
            .principal(session_id)
            .await?
            .ok_or(UserError::NotAuthenticated)?;
        if !self.users.authorize(&user, scope) {
            return Err(UserError::MissingScope {
                scope: scope.to_string(),
            }
            .into());
        }
        Ok(user)
    }

    /// End a session. Returns whether it existed.
    pub async fn logout(&self, session_id: &str) -> Result<bool> {
        self.sessions.end(session_id).await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        self.users.authenticate(username, password).await
    }

    pub fn authorize(&self, user: &User, required_scope: &str) -> bool {
        self.users.authorize(user, required_scope)
    }

    pub fn redact_user(&self, user: &User) -> RedactedUser {
        self.users.redact(user)
    }

    pub async fn create_session(&self, ttl: Duration) -> Result<Session> {
        self.sessions.create(ttl).await
    }

    pub async fn bind_session(&self, session: &mut Session, user_id: &str) -> Result<()> {
        self.sessions.bind(session, user_id).await
    }

    pub async fn renew_session(&self, session: &mut Session, ttl: Duration) -> Result<()> {
        self.sessions.renew(session, ttl).await
    }

    pub async fn resolve_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.sessions.resolve(session_id).await
    }
}
