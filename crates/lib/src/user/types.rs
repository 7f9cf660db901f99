//! Core data types for the user system

use serde::{Deserialize, Serialize};

use crate::constants::ROOT_SCOPE;
use crate::credentials::{PasswordCredentials, derive_credentials, verify_password};
use crate::ids::generate_id;
use crate::scope;

/// A user account as stored by the persistence layer.
///
/// `password_hash` is always the PBKDF2 digest of the current password under
/// `password_salt`. Use [`User::redacted`] before exposing a user externally.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique identifier
    pub id: String,

    /// Unique login name
    pub username: String,

    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,

    /// Lowercase hex PBKDF2-HMAC-SHA256 digest
    pub password_hash: String,

    /// Lowercase hex salt
    pub password_salt: String,

    /// Optional icon reference
    #[serde(default)]
    pub user_icon: Option<String>,

    /// Granted scope paths, possibly including the `root` sentinel
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl User {
    /// Create a user with a fresh id, the given credentials and no scopes.
    pub fn new(username: impl Into<String>, credentials: PasswordCredentials) -> Self {
        Self {
            id: generate_id(),
            username: username.into(),
            display_name: None,
            password_hash: credentials.hash,
            password_salt: credentials.salt,
            user_icon: None,
            scopes: Vec::new(),
        }
    }

    /// Create a user, deriving credentials from `password`.
    ///
    /// Runs the full PBKDF2 derivation on the calling thread.
    pub fn create(username: impl Into<String>, password: impl AsRef<str>) -> Self {
        Self::new(username, derive_credentials(password))
    }

    /// Check a password against the stored credentials.
    pub fn verify(&self, password: impl AsRef<str>) -> bool {
        verify_password(password, &self.password_salt, &self.password_hash)
    }

    /// Replace the stored credentials.
    pub fn set_credentials(&mut self, credentials: PasswordCredentials) {
        self.password_hash = credentials.hash;
        self.password_salt = credentials.salt;
    }

    /// Whether the user holds `scope` or one of its ancestors.
    pub fn has_scope(&self, scope: &str) -> bool {
        scope::has_scope(self.scopes.as_slice(), scope)
    }

    /// Whether the user holds `scope` or anything beneath it.
    pub fn within_scope(&self, scope: &str) -> bool {
        scope::within_scope(self.scopes.as_slice(), scope)
    }

    /// Whether the user carries the root sentinel.
    pub fn is_root(&self) -> bool {
        self.scopes.iter().any(|s| s == ROOT_SCOPE)
    }

    /// Add a scope if not already granted. Returns whether it was added.
    pub fn grant_scope(&mut self, scope: impl Into<String>) -> bool {
        let scope = scope.into();
        if self.scopes.contains(&scope) {
            return false;
        }
        self.scopes.push(scope);
        true
    }

    /// Remove a scope. Returns whether it was present.
    pub fn revoke_scope(&mut self, scope: &str) -> bool {
        let before = self.scopes.len();
        self.scopes.retain(|s| s != scope);
        self.scopes.len() != before
    }

    /// Replace all scopes, dropping duplicates but keeping first-seen order.
    pub fn set_scopes<I, S>(&mut self, scopes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.clear();
        for scope in scopes {
            self.grant_scope(scope);
        }
    }

    /// The externally safe view of this user.
    pub fn redacted(&self) -> RedactedUser {
        RedactedUser::from(self)
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("user_icon", &self.user_icon)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// A user with credential material stripped, safe to hand to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedUser {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub user_icon: Option<String>,
    pub scopes: Vec<String>,
}

impl From<&User> for RedactedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            user_icon: user.user_icon.clone(),
            scopes: user.scopes.clone(),
        }
    }
}

/// A partial update to a user's profile and scopes.
///
/// Fields left as `None` are unchanged. For the optional profile fields the
/// inner `Option` sets or clears the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserEdit {
    pub username: Option<String>,
    pub display_name: Option<Option<String>>,
    pub user_icon: Option<Option<String>>,
    pub scopes: Option<Vec<String>>,
}

impl UserEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = Some(display_name);
        self
    }

    pub fn user_icon(mut self, user_icon: Option<String>) -> Self {
        self.user_icon = Some(user_icon);
        self
    }

    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Whether applying this edit would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply to `user` in place.
    pub(crate) fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(display_name) = self.display_name {
            user.display_name = display_name;
        }
        if let Some(user_icon) = self.user_icon {
            user.user_icon = user_icon;
        }
        if let Some(scopes) = self.scopes {
            user.set_scopes(scopes);
        }
    }
}
