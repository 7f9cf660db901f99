//! Scope error types.

use thiserror::Error;

/// Errors raised when a caller asks for a scope path to be validated.
///
/// Scope checks themselves never fail; these only surface from explicit
/// validation such as [`ScopePath::parse`](super::ScopePath::parse) or
/// [`ScopeCatalog::require`](super::ScopeCatalog::require).
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The path is syntactically malformed (empty, or with an empty segment).
    #[error("Invalid scope path '{path}': {reason}")]
    InvalidScopePath {
        /// The offending path
        path: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The path is well formed but not part of the scope catalog.
    #[error("Unknown scope: {path}")]
    UnknownScope {
        /// The path that was looked up
        path: String,
    },
}

impl ScopeError {
    /// Check if this error indicates the scope was not found in the catalog.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScopeError::UnknownScope { .. })
    }

    /// Check if this error indicates a malformed path.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ScopeError::InvalidScopePath { .. })
    }
}

impl From<ScopeError> for crate::Error {
    fn from(err: ScopeError) -> Self {
        crate::Error::Scope(err)
    }
}
