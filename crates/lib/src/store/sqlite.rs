//! SQLite store implementation.
//!
//! Users and sessions are stored in two tables. Scopes are kept as a JSON
//! array column. Session deadlines are stored as milliseconds since the Unix
//! epoch and indexed, so [`AuthStore::purge_expired_sessions`] is a single
//! range delete.

use std::any::Any;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::{AuthStore, StoreError};
use crate::Result;
use crate::session::Session;
use crate::user::User;

/// Extension trait for sqlx Result types to simplify error handling.
pub(crate) trait SqlxResultExt<T> {
    /// Convert sqlx error to StoreError with context message.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            StoreError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        display_name TEXT,
        password_hash TEXT NOT NULL,
        password_salt TEXT NOT NULL,
        user_icon TEXT,
        scopes TEXT NOT NULL DEFAULT '[]'
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT,
        expire_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS sessions_expire_at ON sessions (expire_at)",
];

type UserRow = (
    String,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    String,
);

type SessionRow = (String, Option<String>, i64);

/// SQLite-backed [`AuthStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) a database file.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .sql_context("Failed to open SQLite database")?;
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .sql_context("Failed to open in-memory SQLite database")?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .sql_context("Failed to initialize schema")?;
        }
        Ok(Self { pool })
    }
}

fn user_from_row(row: UserRow) -> Result<User> {
    let (id, username, display_name, password_hash, password_salt, user_icon, scopes) = row;
    let scopes: Vec<String> =
        serde_json::from_str(&scopes).map_err(|e| StoreError::CorruptRecord {
            id: id.clone(),
            reason: format!("invalid scopes column: {e}"),
        })?;
    Ok(User {
        id,
        username,
        display_name,
        password_hash,
        password_salt,
        user_icon,
        scopes,
    })
}

fn session_from_row(row: SessionRow) -> Result<Session> {
    let (id, user_id, expire_at) = row;
    let expire_at = Utc.timestamp_millis_opt(expire_at).single().ok_or_else(|| {
        StoreError::CorruptRecord {
            id: id.clone(),
            reason: format!("expire_at out of range: {expire_at}"),
        }
    })?;
    Ok(Session {
        id,
        user_id,
        expire_at,
    })
}

const SELECT_USER: &str = "SELECT id, username, display_name, password_hash, password_salt, user_icon, scopes FROM users";

#[async_trait]
impl AuthStore for SqliteStore {
    async fn load_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .sql_context("Failed to load user")?;
        row.map(user_from_row).transpose()
    }

    async fn load_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .sql_context("Failed to load user by username")?;
        row.map(user_from_row).transpose()
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let scopes = serde_json::to_string(&user.scopes)
            .map_err(|e| StoreError::SerializationFailed { source: e })?;
        let result = sqlx::query(
            "INSERT INTO users (id, username, display_name, password_hash, password_salt, user_icon, scopes)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                display_name = excluded.display_name,
                password_hash = excluded.password_hash,
                password_salt = excluded.password_salt,
                user_icon = excluded.user_icon,
                scopes = excluded.scopes",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(&user.user_icon)
        .bind(scopes)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::warn!(username = %user.username, "Rejected save of duplicate username");
                Err(StoreError::UsernameTaken {
                    username: user.username.clone(),
                }
                .into())
            }
            Err(e) => Err(e).sql_context("Failed to save user"),
        }
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .sql_context("Failed to delete user")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{SELECT_USER} ORDER BY username"))
            .fetch_all(&self.pool)
            .await
            .sql_context("Failed to list users")?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn load_session(&self, id: &str) -> Result<Option<Session>> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT id, user_id, expire_at FROM sessions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .sql_context("Failed to load session")?;
        row.map(session_from_row).transpose()
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expire_at) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                expire_at = excluded.expire_at",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.expire_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .sql_context("Failed to save session")?;
        Ok(())
    }

    async fn update_session(&self, session: &Session) -> Result<bool> {
        let result = sqlx::query("UPDATE sessions SET user_id = ?, expire_at = ? WHERE id = ?")
            .bind(&session.user_id)
            .bind(session.expire_at.timestamp_millis())
            .bind(&session.id)
            .execute(&self.pool)
            .await
            .sql_context("Failed to update session")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .sql_context("Failed to delete session")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_session_if_expired(&self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ? AND expire_at <= ?")
            .bind(id)
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await
            .sql_context("Failed to delete expired session")?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire_at <= ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await
            .sql_context("Failed to purge expired sessions")?;
        Ok(result.rows_affected() as usize)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
