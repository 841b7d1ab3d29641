//! Module for database connection setup.
//!
//! This module is responsible for opening the SQLite connection pool, applying
//! the embedded migrations, and retrying the connection at startup.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub mod models;
pub mod resilience;
pub mod retry;

pub use resilience::{ConnectError, ConnectionManager, ConnectionState, Connector};
pub use retry::{Backoff, RetryPolicy};

/// Opens SQLite pools for a given database URL.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    database_url: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl SqliteConnector {
    pub fn new(config: &Config) -> Self {
        Self {
            database_url: config.database_url.clone(),
            max_connections: config.max_connections,
            acquire_timeout: Duration::from_secs(config.acquire_timeout_seconds),
        }
    }

    /// Connector for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(3),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    type Connection = SqlitePool;

    async fn connect(&self) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .with_context(|| format!("Invalid database URL: {}", self.database_url))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(self.acquire_timeout);

        // Every in-memory connection is its own database, so the pool must
        // keep exactly one connection alive for the life of the process.
        pool_options = if self.is_in_memory() {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(self.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(pool)
    }

    async fn close(&self, pool: SqlitePool) {
        pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_connect_runs_migrations() {
        let pool = SqliteConnector::in_memory().connect().await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(tables, 1);
    }

    #[tokio::test]
    async fn test_second_connect_keeps_first_pool_usable() {
        let manager = ConnectionManager::new(SqliteConnector::in_memory());

        let first = manager.connect(RetryPolicy::default()).await.unwrap();
        let second = manager.connect(RetryPolicy::default()).await.unwrap();

        assert!(!first.is_closed());
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&first).await.unwrap();
        assert_eq!(one, 1);
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&second).await.unwrap();
        assert_eq!(one, 1);

        manager.disconnect().await;
        assert!(first.is_closed());
    }

    #[tokio::test]
    async fn test_unopenable_database_fails_every_attempt() {
        let connector = SqliteConnector {
            database_url: "sqlite:///nonexistent-dir/nested/auth.db".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_millis(100),
        };
        let manager = ConnectionManager::new(connector);

        let result = manager
            .connect(RetryPolicy::fixed(2, Duration::from_millis(1)))
            .await;

        assert!(matches!(result, Err(ConnectError::Exhausted { attempts: 2, .. })));
    }
}
