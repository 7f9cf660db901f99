//! Security configuration
//!
//! [`AuthConfig`] holds the session lifetime and the bootstrap account. It is
//! read from TOML:
//!
//! ```toml
//! [sessions]
//! expiration = 3600.0
//!
//! [users.default]
//! username = "admin"
//! password = "change-me"
//! create_if_not_present = true
//! ```
//!
//! Every section and field is optional and falls back to its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Result;
use crate::constants::DEFAULT_SESSION_EXPIRATION_SECS;

/// Errors raised while loading or validating configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {source}")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Check if this error came from reading the file.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ConfigError::FileIo { .. })
    }

    /// Check if this error indicates a rejected value or malformed file.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ConfigError::Parse { .. } | ConfigError::Invalid { .. })
    }
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

/// Top-level security configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub sessions: SessionsConfig,
    pub users: UsersConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Session lifetime in seconds
    pub expiration: f64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            expiration: DEFAULT_SESSION_EXPIRATION_SECS,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    pub default: DefaultUserConfig,
}

/// The bootstrap account, created with the `root` scope.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultUserConfig {
    pub username: String,
    pub password: String,
    pub create_if_not_present: bool,
}

impl Default for DefaultUserConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
            create_if_not_present: false,
        }
    }
}

impl std::fmt::Debug for DefaultUserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultUserConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("create_if_not_present", &self.create_if_not_present)
            .finish()
    }
}

impl AuthConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo { source: e })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded auth config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let expiration = self.sessions.expiration;
        if !expiration.is_finite() || expiration <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sessions.expiration",
                reason: format!("must be a positive number of seconds, got {expiration}"),
            }
            .into());
        }
        // Guards the conversion in session_ttl
        if Duration::try_from_secs_f64(expiration).is_err() {
            return Err(ConfigError::Invalid {
                field: "sessions.expiration",
                reason: format!("{expiration} seconds is out of range"),
            }
            .into());
        }

        let default_user = &self.users.default;
        if default_user.username.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "users.default.username",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if default_user.create_if_not_present && default_user.password.is_empty() {
            return Err(ConfigError::Invalid {
                field: "users.default.password",
                reason: "required when create_if_not_present is set".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The configured session lifetime.
    ///
    /// Falls back to the default lifetime if `sessions.expiration` is not
    /// valid; [`validate`](Self::validate) rejects such values up front.
    pub fn session_ttl(&self) -> Duration {
        Duration::try_from_secs_f64(self.sessions.expiration)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs_f64(DEFAULT_SESSION_EXPIRATION_SECS))
    }
}
