//! Session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::generate_id;

/// A session as stored by the persistence layer.
///
/// A session starts anonymous and becomes bound once a login succeeds. It is
/// considered gone as soon as `expire_at` passes, whether or not the store
/// has physically removed it yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token handed to the client
    pub id: String,

    /// Bound user, weakly referenced
    #[serde(default)]
    pub user_id: Option<String>,

    /// Instant after which the session no longer resolves
    pub expire_at: DateTime<Utc>,
}

/// Lifecycle state of a [`Session`] at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet bound to a user
    Anonymous,
    /// Bound to a user and still valid
    Bound,
    /// Past its deadline
    Expired,
}

impl Session {
    /// Create an unbound session with a fresh id.
    pub fn anonymous(expire_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(),
            user_id: None,
            expire_at,
        }
    }

    /// Whether a user has been bound to this session.
    pub fn is_bound(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether the deadline has been reached at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_at
    }

    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if self.is_expired_at(now) {
            SessionState::Expired
        } else if self.is_bound() {
            SessionState::Bound
        } else {
            SessionState::Anonymous
        }
    }
}
