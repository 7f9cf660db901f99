//! User accounts over an [`AuthStore`].

use std::sync::Arc;

use super::{RedactedUser, User, UserEdit, UserError};
use crate::Result;
use crate::config::DefaultUserConfig;
use crate::constants::{HASH_LENGTH, ROOT_SCOPE, SALT_LENGTH};
use crate::credentials::{PasswordCredentials, derive_credentials, verify_password};
use crate::store::{AuthStore, StoreError};

/// Run a CPU-bound credential operation on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        UserError::CredentialTaskFailed {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Turn a store-level username collision into the user-level error.
fn map_username_conflict(err: crate::Error) -> crate::Error {
    match err {
        crate::Error::Store(StoreError::UsernameTaken { username }) => {
            UserError::UsernameAlreadyExists { username }.into()
        }
        other => other,
    }
}

/// Creates, authenticates and manages users.
///
/// Password derivation and verification run on tokio's blocking pool, so
/// every method that touches credentials must be called from within a tokio
/// runtime.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn AuthStore>,
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory").finish_non_exhaustive()
    }
}

impl UserDirectory {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    /// Create a user with no scopes.
    ///
    /// # Errors
    /// - [`UserError::EmptyUsername`] for a blank username
    /// - [`UserError::UsernameAlreadyExists`] if the name is taken
    pub async fn create(&self, username: &str, password: &str) -> Result<User> {
        self.create_with(username, password, UserEdit::new()).await
    }

    /// Create a user with `edit` applied before the first write.
    ///
    /// The record is saved once, so a failed save leaves nothing behind. A
    /// username in `edit` replaces `username`.
    ///
    /// # Errors
    /// - [`UserError::EmptyUsername`] for a blank username
    /// - [`UserError::UsernameAlreadyExists`] if the name is taken
    pub async fn create_with(
        &self,
        username: &str,
        password: &str,
        edit: UserEdit,
    ) -> Result<User> {
        let username = edit.username.clone().unwrap_or_else(|| username.to_string());
        if username.trim().is_empty() {
            return Err(UserError::EmptyUsername.into());
        }
        // Fail before paying for a derivation; the store re-checks on save
        if self.store.load_user_by_username(&username).await?.is_some() {
            return Err(UserError::UsernameAlreadyExists { username }.into());
        }

        let password = password.to_string();
        let credentials = run_blocking(move || derive_credentials(password)).await?;
        let mut user = User::new(username, credentials);
        edit.apply(&mut user);
        self.store
            .save_user(&user)
            .await
            .map_err(map_username_conflict)?;

        tracing::debug!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Verify a username and password.
    ///
    /// An unknown username and a wrong password both fail with
    /// [`UserError::InvalidCredentials`]. For an unknown username a
    /// derivation still runs against a throwaway salt so both paths cost the
    /// same.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self.store.load_user_by_username(username).await?;
        let password = password.to_string();

        let Some(user) = user else {
            run_blocking(move || {
                std::hint::black_box(verify_password(
                    password,
                    &"00".repeat(SALT_LENGTH),
                    &"00".repeat(HASH_LENGTH),
                ));
            })
            .await?;
            return Err(UserError::InvalidCredentials.into());
        };

        let salt = user.password_salt.clone();
        let hash = user.password_hash.clone();
        let verified = run_blocking(move || verify_password(password, &salt, &hash)).await?;
        if !verified {
            return Err(UserError::InvalidCredentials.into());
        }
        Ok(user)
    }

    /// Strip credential material for external exposure.
    pub fn redact(&self, user: &User) -> RedactedUser {
        user.redacted()
    }

    /// Whether `user` holds `required_scope` or one of its ancestors.
    pub fn authorize(&self, user: &User, required_scope: &str) -> bool {
        user.has_scope(required_scope)
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<User>> {
        self.store.load_user_by_id(user_id).await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.store.load_user_by_username(username).await
    }

    /// All users, redacted, ordered by username.
    pub async fn list(&self) -> Result<Vec<RedactedUser>> {
        let mut users: Vec<RedactedUser> = self
            .store
            .list_users()
            .await?
            .iter()
            .map(RedactedUser::from)
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn require(&self, user_id: &str) -> Result<User> {
        self.store
            .load_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                UserError::UserNotFound {
                    user_id: user_id.to_string(),
                }
                .into()
            })
    }

    /// Apply a partial update and persist it.
    pub async fn edit(&self, user_id: &str, edit: UserEdit) -> Result<User> {
        if edit
            .username
            .as_deref()
            .is_some_and(|u| u.trim().is_empty())
        {
            return Err(UserError::EmptyUsername.into());
        }

        let mut user = self.require(user_id).await?;
        if edit.is_empty() {
            return Ok(user);
        }
        edit.apply(&mut user);
        self.store
            .save_user(&user)
            .await
            .map_err(map_username_conflict)?;

        tracing::debug!(user_id = %user.id, "User edited");
        Ok(user)
    }

    /// Add a single scope. Returns the updated user.
    pub async fn grant_scope(&self, user_id: &str, scope: &str) -> Result<User> {
        let mut user = self.require(user_id).await?;
        if user.grant_scope(scope) {
            self.store.save_user(&user).await?;
            tracing::debug!(user_id = %user.id, scope, "Scope granted");
        }
        Ok(user)
    }

    /// Re-derive credentials under a fresh salt.
    pub async fn change_password(&self, user_id: &str, new_password: &str) -> Result<()> {
        let mut user = self.require(user_id).await?;
        let password = new_password.to_string();
        let credentials: PasswordCredentials =
            run_blocking(move || derive_credentials(password)).await?;
        user.set_credentials(credentials);
        self.store.save_user(&user).await?;

        tracing::debug!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Delete a user. Sessions bound to it are left to expire.
    ///
    /// # Errors
    /// - [`UserError::UserNotFound`] if no such user exists
    /// - [`UserError::RootUserUndeletable`] if the user holds `root`
    pub async fn delete(&self, user_id: &str) -> Result<()> {
        let user = self.require(user_id).await?;
        if user.is_root() {
            return Err(UserError::RootUserUndeletable {
                user_id: user_id.to_string(),
            }
            .into());
        }
        self.store.delete_user(user_id).await?;

        tracing::debug!(user_id, "User deleted");
        Ok(())
    }

    /// Create the bootstrap account if configured and missing.
    ///
    /// Returns the created user, or `None` when nothing was done.
    pub async fn ensure_default_user(&self, config: &DefaultUserConfig) -> Result<Option<User>> {
        if !config.create_if_not_present {
            return Ok(None);
        }
        if self
            .store
            .load_user_by_username(&config.username)
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let user = self
            .create_with(
                &config.username,
                &config.password,
                UserEdit::new().scopes([ROOT_SCOPE]),
            )
            .await?;

        tracing::info!(username = %user.username, "Created default user");
        Ok(Some(user))
    }
}
