//!
//! haus-auth: the authorization and session core of the Haus
//! household-automation control plane.
//!
//! ## Core Concepts
//!
//! * **Scopes (`scope`)**: Dotted permission paths such as `users.manage.edit`.
//!   A grant authorizes its whole subtree; the `root` sentinel authorizes
//!   everything. The fixed catalog of known scopes is
//!   [`scope::APPLICATION_SCOPES`].
//! * **Credentials (`credentials`)**: PBKDF2-HMAC-SHA256 password hashes under a
//!   random salt, verified in constant time.
//! * **Users (`user::UserDirectory`)**: Accounts with credentials and granted
//!   scopes. Login failures never reveal whether the username exists.
//! * **Sessions (`session::SessionStore`)**: Anonymous sessions that are bound
//!   to a user on login, renewed on activity and lazily expired on read.
//! * **Stores (`store::AuthStore`)**: The pluggable persistence layer for users
//!   and sessions.
//! * **Access control (`AccessControl`)**: Login, principal lookup and scope
//!   gating wired over one store.

pub mod access;
pub mod clock;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod ids;
pub mod scope;
pub mod session;
pub mod store;
pub mod user;

pub use access::AccessControl;
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use config::{AuthConfig, ConfigError};
pub use scope::{APPLICATION_SCOPES, ScopeError, has_scope, within_scope};
pub use session::{Session, SessionError, SessionState, SessionStore};
pub use store::{AuthStore, InMemory, StoreError};
pub use user::{RedactedUser, User, UserDirectory, UserEdit, UserError};

/// Result type used throughout the haus-auth library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the haus-auth library.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured scope errors from the scope module
    #[error(transparent)]
    Scope(scope::ScopeError),

    /// Structured user errors from the user module
    #[error(transparent)]
    User(user::UserError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured persistence errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Scope(_) => "scope",
            Error::User(_) => "user",
            Error::Session(_) => "session",
            Error::Store(_) => "store",
            Error::Config(_) => "config",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Scope(scope_err) => scope_err.is_not_found(),
            Error::User(user_err) => user_err.is_not_found(),
            Error::Session(session_err) => session_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_authentication_error(),
            Error::Session(session_err) => session_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_conflict(),
            Error::Store(store_err) => store_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_io_error(),
            Error::Config(config_err) => config_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Scope(scope_err) => scope_err.is_validation_error(),
            Error::Config(config_err) => config_err.is_validation_error(),
            Error::Session(SessionError::InvalidTtl { .. }) => true,
            Error::User(UserError::EmptyUsername) => true,
            _ => false,
        }
    }
}
