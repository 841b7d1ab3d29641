//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the datastore URL, connection retry budget, token signing secret and the
//! server port.

use crate::database::retry::RetryPolicy;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// How the delay between connection attempts evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

impl FromStr for BackoffKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(BackoffKind::Fixed),
            "exponential" => Ok(BackoffKind::Exponential),
            other => anyhow::bail!(
                "DB_CONNECT_BACKOFF must be \"fixed\" or \"exponential\", got \"{}\"",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub db_connect_retries: u32,
    pub db_connect_retry_delay_ms: u64,
    pub db_connect_backoff: BackoffKind,
    /// Upper bound on the delay when `db_connect_backoff` is exponential.
    pub db_connect_max_delay_ms: u64,
    pub jwt_secret: String,
    /// Token lifetime. `None` issues tokens without an `exp` claim.
    pub jwt_expires_in_seconds: Option<u64>,
    pub bcrypt_cost: u32,
    pub server_port: u16,
    /// Broker settings belong to the order service and are only surfaced here.
    pub broker_uri: String,
    pub broker_queue: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://auth.db".to_string());

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5u32)?;
        let acquire_timeout_seconds = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECONDS", 3u64)?;
        let db_connect_retries = parse_or(&lookup, "DB_CONNECT_RETRIES", 5u32)?;
        let db_connect_retry_delay_ms = parse_or(&lookup, "DB_CONNECT_RETRY_DELAY_MS", 5000u64)?;
        let db_connect_backoff = match lookup("DB_CONNECT_BACKOFF") {
            Some(raw) => raw.parse::<BackoffKind>()?,
            None => BackoffKind::Fixed,
        };
        let db_connect_max_delay_ms = parse_or(&lookup, "DB_CONNECT_MAX_DELAY_MS", 60000u64)?;

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET not set")?;
        if jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let jwt_expires_in_seconds = match parse_or(&lookup, "JWT_EXPIRES_IN_SECONDS", 86400u64)? {
            0 => None,
            seconds => Some(seconds),
        };

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        let server_port = parse_or(&lookup, "SERVER_PORT", 3000u16)?;

        let broker_uri = lookup("RABBITMQ_URI").unwrap_or_else(|| "amqp://localhost".to_string());
        let broker_queue = lookup("RABBITMQ_QUEUE").unwrap_or_else(|| "orders".to_string());

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            db_connect_retries,
            db_connect_retry_delay_ms,
            db_connect_backoff,
            db_connect_max_delay_ms,
            jwt_secret,
            jwt_expires_in_seconds,
            bcrypt_cost,
            server_port,
            broker_uri,
            broker_queue,
        })
    }

    /// Retry policy used when establishing the datastore connection at startup.
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.db_connect_retry_delay_ms);
        match self.db_connect_backoff {
            BackoffKind::Fixed => RetryPolicy::fixed(self.db_connect_retries, delay),
            BackoffKind::Exponential => RetryPolicy::exponential(
                self.db_connect_retries,
                delay,
                Duration::from_millis(self.db_connect_max_delay_ms),
            ),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
