//! Persistence collaborator for users and sessions
//!
//! The [`AuthStore`] trait is the only storage contract the authorization
//! core depends on: load and save records by id, look users up by username,
//! and purge sessions whose deadline has passed. The core never assumes a
//! purge has run; session expiry is re-checked on every read.
//!
//! Implementations:
//! - [`InMemory`]: `HashMap`s behind async locks with optional JSON file
//!   persistence. Suitable for tests, development and the CLI.
//! - `SqliteStore` (feature `sqlite`): sqlx-backed SQLite tables.
//!
//! Implementations must serialize writes per record. Concurrent writes to
//! the same user or session are last-writer-wins.

use std::any::Any;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::session::Session;
use crate::user::User;

pub mod errors;
pub mod in_memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use errors::StoreError;
pub use in_memory::InMemory;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Storage for [`User`] and [`Session`] records.
///
/// All implementations must be `Send` and `Sync` so one store can back many
/// concurrent requests, and implement `Any` so callers can downcast to a
/// concrete store (for example to save an [`InMemory`] store to disk).
#[async_trait]
pub trait AuthStore: Send + Sync + Any {
    /// Load a user by id.
    async fn load_user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Load a user by username.
    async fn load_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert or replace a user.
    ///
    /// Fails with [`StoreError::UsernameTaken`] if a different user already
    /// holds `user.username`.
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Delete a user by id. Returns whether a record was removed.
    async fn delete_user(&self, id: &str) -> Result<bool>;

    /// All stored users.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Load a session by id, expired or not.
    async fn load_session(&self, id: &str) -> Result<Option<Session>>;

    /// Insert or replace a session.
    async fn save_session(&self, session: &Session) -> Result<()>;

    /// Replace an existing session.
    ///
    /// Returns `false` without writing if no session with `session.id` is
    /// stored, so a deleted session is never brought back.
    async fn update_session(&self, session: &Session) -> Result<bool>;

    /// Delete a session by id. Returns whether a record was removed.
    async fn delete_session(&self, id: &str) -> Result<bool>;

    /// Delete a session only if its stored deadline has passed at `now`.
    ///
    /// The deadline is checked against the record as stored at delete time,
    /// so a concurrent renewal is never lost. Returns whether a record was
    /// removed.
    async fn delete_session_if_expired(&self, id: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Physically remove every session with `expire_at <= now`.
    ///
    /// Returns the number of sessions removed.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Returns a reference to the store as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
