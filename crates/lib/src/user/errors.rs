//! Error types for the user system
use thiserror::Error;

/// Errors raised by user directory and login operations.
///
/// Unknown usernames and wrong passwords both surface as
/// [`UserError::InvalidCredentials`] so callers cannot tell them apart.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UserError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Username already exists: {username}")]
    UsernameAlreadyExists { username: String },

    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Root users cannot be deleted: {user_id}")]
    RootUserUndeletable { user_id: String },

    #[error("User account disabled")]
    AccountDisabled,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Missing required scope: {scope}")]
    MissingScope { scope: String },

    #[error("Credential derivation task failed: {reason}")]
    CredentialTaskFailed { reason: String },
}

impl UserError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::UserNotFound { .. })
    }

    /// Check if this error is a login failure.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            UserError::InvalidCredentials | UserError::AccountDisabled | UserError::NotAuthenticated
        )
    }

    /// Check if this error indicates an authenticated principal lacked rights.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            UserError::MissingScope { .. } | UserError::RootUserUndeletable { .. }
        )
    }

    /// Check if this error indicates a conflict with existing data.
    pub fn is_conflict(&self) -> bool {
        matches!(self, UserError::UsernameAlreadyExists { .. })
    }
}

impl From<UserError> for crate::Error {
    fn from(err: UserError) -> Self {
        crate::Error::User(err)
    }
}
