//! Database repository for registered users.
//!
//! Provides the credential store used by the authentication service.

use crate::database::models::User;
use crate::errors::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Persistent collection of users keyed by username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Creates a user, failing with [`StoreError::DuplicateUsername`] if the
    /// username is already registered.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Removes every user. Returns the number of records deleted.
    async fn drop_all(&self) -> Result<u64, StoreError>;
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool handle
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of users stored under the given username (0 or 1).
    pub async fn count_by_username(&self, username: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// The `UNIQUE` constraint on `username` makes this a single atomic
    /// check-and-insert.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let id = Uuid::now_v7().to_string();

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                Err(StoreError::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn drop_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Connector, SqliteConnector};

    async fn repository() -> UserRepository {
        let pool = SqliteConnector::in_memory().connect().await.unwrap();
        UserRepository::new(pool)
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let repo = repository().await;

        let created = repo.insert("alice", "digest").await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.username, "alice");

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "digest");
        assert_eq!(found.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_username_is_none() {
        let repo = repository().await;
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected_without_mutation() {
        let repo = repository().await;
        let first = repo.insert("alice", "first").await.unwrap();

        let err = repo.insert("alice", "second").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(ref name) if name == "alice"));

        assert_eq!(repo.count_by_username("alice").await.unwrap(), 1);
        let stored = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.password_hash, "first");
    }

    #[tokio::test]
    async fn test_drop_all_empties_the_store() {
        let repo = repository().await;
        repo.insert("alice", "a").await.unwrap();
        repo.insert("bob", "b").await.unwrap();

        assert_eq!(repo.drop_all().await.unwrap(), 2);
        assert!(repo.find_by_username("alice").await.unwrap().is_none());
    }
}
