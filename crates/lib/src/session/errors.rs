//! Session error types.

use thiserror::Error;

/// Errors raised by session lifecycle operations.
///
/// Resolving an unknown or expired session is not an error; it yields
/// `None`. [`SessionError::SessionNotFound`] is only raised by operations
/// that cannot proceed without a live session, such as login.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No live session with this id.
    #[error("Session not found or expired")]
    SessionNotFound,

    /// A lifetime too large to represent as a deadline.
    #[error("Invalid session lifetime: {reason}")]
    InvalidTtl {
        /// Why the lifetime was rejected
        reason: String,
    },
}

impl SessionError {
    /// Check if this error indicates a missing or expired session.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::SessionNotFound)
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
