use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use thiserror::Error;

use crate::config::DbConfig;

/// Error type for credential store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Persistence abstraction for user records. Inserts hashed credentials
/// and reads them back by username; nothing updates or deletes a record.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user record. `password_hash` must already be hashed;
    /// plaintext never reaches the store.
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<i32, StoreError>;

    /// Stored password hash for `username`. Absence is `Ok(None)`, not an
    /// error.
    async fn find_by_username(&self, username: &str) -> Result<Option<String>, StoreError>;
}

#[derive(Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        let opts = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .context("connect to database")?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StoreError::DuplicateKey(constraint);
        }
    }
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Connection(e.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<i32, StoreError> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<String>, StoreError> {
        let hash = sqlx::query_scalar::<_, String>(
            r#"
            SELECT password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(hash)
    }
}

/// In-memory store with the same uniqueness guarantees as the `users`
/// table. Backs `AppState::fake` and the core unit tests so the suite
/// runs without a live database.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: std::sync::Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i32,
    by_username: std::collections::HashMap<String, (i32, String)>,
    emails: std::collections::HashSet<String>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<i32, StoreError> {
        let mut inner = self.inner.lock().expect("memory store lock");
        if inner.by_username.contains_key(username) {
            return Err(StoreError::DuplicateKey("users_username_key".into()));
        }
        if inner.emails.contains(email) {
            return Err(StoreError::DuplicateKey("users_email_key".into()));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .by_username
            .insert(username.to_string(), (id, password_hash.to_string()));
        inner.emails.insert(email.to_string());
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().expect("memory store lock");
        Ok(inner.by_username.get(username).map(|(_, hash)| hash.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_assigns_sequential_ids() {
        let store = MemoryCredentialStore::default();
        let first = store.insert("alice", "hash-a", "a@x.com").await.unwrap();
        let second = store.insert("bob", "hash-b", "b@x.com").await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_username_and_email() {
        let store = MemoryCredentialStore::default();
        store.insert("alice", "hash", "a@x.com").await.unwrap();

        let err = store.insert("alice", "hash", "a2@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref c) if c.contains("username")));

        let err = store.insert("alice2", "hash", "a@x.com").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref c) if c.contains("email")));
    }

    #[tokio::test]
    async fn memory_store_find_absent_is_none() {
        let store = MemoryCredentialStore::default();
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }
}
