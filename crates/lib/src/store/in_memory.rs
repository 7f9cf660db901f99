//! In-memory store implementation
//!
//! Users and sessions live in `HashMap`s behind tokio `RwLock`s. The whole
//! state can be written to and read back from a JSON file.

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{AuthStore, StoreError};
use crate::Result;
use crate::session::Session;
use crate::user::User;

/// The current persistence file format version.
const PERSISTENCE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk form of an [`InMemory`] store.
#[derive(Serialize, Deserialize, Default)]
struct SerializableStore {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    users: HashMap<String, User>,
    #[serde(default)]
    sessions: HashMap<String, Session>,
}

/// A simple in-memory store.
///
/// Username uniqueness is enforced on save. Expired sessions stay in memory
/// until [`AuthStore::purge_expired_sessions`] or an explicit delete removes
/// them.
#[derive(Debug, Default)]
pub struct InMemory {
    users: RwLock<HashMap<String, User>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemory {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Saves the entire store to `path` as pretty-printed JSON.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serializable = SerializableStore {
            version: PERSISTENCE_VERSION,
            users: self.users.read().await.clone(),
            sessions: self.sessions.read().await.clone(),
        };

        let json = serde_json::to_string_pretty(&serializable)
            .map_err(|e| StoreError::SerializationFailed { source: e })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| StoreError::FileIo { source: e })?;
        Ok(())
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => {
                let stored: SerializableStore = serde_json::from_str(&json)
                    .map_err(|e| StoreError::DeserializationFailed { source: e })?;
                Ok(Self {
                    users: RwLock::new(stored.users),
                    sessions: RwLock::new(stored.sessions),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(StoreError::FileIo { source: e }.into()),
        }
    }
}

#[async_trait]
impl AuthStore for InMemory {
    async fn load_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn load_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            tracing::warn!(username = %user.username, "Rejected save of duplicate username");
            return Err(StoreError::UsernameTaken {
                username: user.username.clone(),
            }
            .into());
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn load_session(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn update_session(&self, session: &Session) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn delete_session_if_expired(&self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(id).is_some_and(|s| s.is_expired_at(now)) {
            sessions.remove(id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok(before - sessions.len())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
