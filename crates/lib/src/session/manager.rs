//! Session lifecycle over an [`AuthStore`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use super::{Session, SessionError};
use crate::Result;
use crate::clock::{Clock, SystemClock, millis_to_utc};
use crate::store::AuthStore;

/// Creates, binds, renews and resolves sessions.
///
/// Expiry is checked lazily on every [`resolve`](Self::resolve) against the
/// clock, so a record the store has not purged yet still fails to resolve
/// once its deadline passes.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn AuthStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Use the system clock.
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn AuthStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The clock deadlines are measured against.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn deadline(&self, ttl: Duration) -> Result<DateTime<Utc>> {
        let delta = TimeDelta::from_std(ttl).map_err(|e| SessionError::InvalidTtl {
            reason: e.to_string(),
        })?;
        // Whole milliseconds, the finest precision every store keeps
        let deadline = millis_to_utc(self.clock.now_millis())
            .checked_add_signed(delta)
            .ok_or_else(|| SessionError::InvalidTtl {
                reason: format!("{}s from now is out of range", ttl.as_secs()),
            })?;
        Ok(deadline)
    }

    /// Create and persist an anonymous session valid for `ttl`.
    pub async fn create(&self, ttl: Duration) -> Result<Session> {
        let session = Session::anonymous(self.deadline(ttl)?);
        self.store.save_session(&session).await?;
        tracing::debug!(expire_at = %session.expire_at, "Session created");
        Ok(session)
    }

    /// Write back a session that must still exist in the store.
    async fn update(&self, session: &Session) -> Result<()> {
        if !self.store.update_session(session).await? {
            return Err(SessionError::SessionNotFound.into());
        }
        Ok(())
    }

    /// Bind `user_id` to the session in place and persist it.
    ///
    /// Binding an already bound session replaces the user. Fails with
    /// [`SessionError::SessionNotFound`] if the session has been removed.
    pub async fn bind(&self, session: &mut Session, user_id: impl Into<String>) -> Result<()> {
        let user_id = user_id.into();
        if session.user_id.as_deref().is_some_and(|u| u != user_id) {
            tracing::debug!("Rebinding session to a different user");
        }
        session.user_id = Some(user_id);
        self.update(session).await?;
        tracing::debug!("Session bound");
        Ok(())
    }

    /// Push the deadline to `now + ttl` and persist it.
    ///
    /// The new deadline counts from the renewal instant, not from creation.
    /// Fails with [`SessionError::SessionNotFound`] if the session has been
    /// removed.
    pub async fn renew(&self, session: &mut Session, ttl: Duration) -> Result<()> {
        session.expire_at = self.deadline(ttl)?;
        self.update(session).await?;
        tracing::debug!(expire_at = %session.expire_at, "Session renewed");
        Ok(())
    }

    /// Fetch a live session by id.
    ///
    /// Unknown and expired sessions both resolve to `None`. An expired record
    /// found here is deleted on a best-effort basis, unless it was renewed in
    /// the meantime.
    pub async fn resolve(&self, session_id: &str) -> Result<Option<Session>> {
        let Some(session) = self.store.load_session(session_id).await? else {
            return Ok(None);
        };

        let now = self.clock.now_utc();
        if session.is_expired_at(now) {
            if let Err(e) = self.store.delete_session_if_expired(session_id, now).await {
                tracing::warn!(error = %e, "Failed to delete expired session");
            }
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Delete a session. Returns whether one existed.
    pub async fn end(&self, session_id: &str) -> Result<bool> {
        let removed = self.store.delete_session(session_id).await?;
        if removed {
            tracing::debug!("Session ended");
        }
        Ok(removed)
    }

    /// Physically remove every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let purged = self
            .store
            .purge_expired_sessions(self.clock.now_utc())
            .await?;
        tracing::debug!(purged, "Purged expired sessions");
        Ok(purged)
    }
}
