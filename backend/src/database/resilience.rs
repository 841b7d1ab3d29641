//! Datastore connection lifecycle with bounded retries.
//!
//! [`ConnectionManager`] owns the process-wide connection. It is used by the
//! process boundary (`main`) only; request handlers receive a cloned handle.

use super::retry::RetryPolicy;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Opens and closes one kind of datastore connection.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Clone + Send + Sync + 'static;

    /// Makes a single connection attempt.
    async fn connect(&self) -> anyhow::Result<Self::Connection>;

    /// Releases a connection obtained from [`Connector::connect`].
    async fn close(&self, connection: Self::Connection);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    FailedPermanently,
}

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("datastore unreachable after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("connection attempts interrupted by shutdown after {attempts} attempts")]
    Interrupted { attempts: u32 },
}

pub struct ConnectionManager<C: Connector> {
    connector: C,
    state: Mutex<ConnectionState>,
    connection: Mutex<Option<C::Connection>>,
    attempts: AtomicU32,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            state: Mutex::new(ConnectionState::Disconnected),
            connection: Mutex::new(None),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attempts made by the most recent `connect` call.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The held connection, if connected.
    pub fn connection(&self) -> Option<C::Connection> {
        self.connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Connects, retrying according to `policy`.
    pub async fn connect(&self, policy: RetryPolicy) -> Result<C::Connection, ConnectError> {
        self.connect_until(policy, std::future::pending()).await
    }

    /// Connects, retrying according to `policy`, giving up early if `shutdown`
    /// completes while waiting between attempts.
    ///
    /// When already connected, the held connection is returned as is and no
    /// attempt is made.
    pub async fn connect_until<F>(
        &self,
        policy: RetryPolicy,
        shutdown: F,
    ) -> Result<C::Connection, ConnectError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.attempts.store(0, Ordering::SeqCst);
        if self.state() == ConnectionState::Connected {
            if let Some(connection) = self.connection() {
                debug!("Datastore already connected, reusing connection");
                return Ok(connection);
            }
        }

        // Nothing is held past this point: failure states never carry a
        // connection.
        self.release().await;
        self.set_state(ConnectionState::Connecting);

        let mut attempt = 0;
        loop {
            attempt += 1;
            self.attempts.store(attempt, Ordering::SeqCst);

            let failure = match self.connector.connect().await {
                Ok(connection) => {
                    info!("Datastore connected (attempt {}/{})", attempt, policy.max_attempts());
                    self.store_connection(connection.clone());
                    self.set_state(ConnectionState::Connected);
                    return Ok(connection);
                }
                Err(e) => e,
            };

            warn!(
                "Datastore connection failed: {}. Retries left: {}",
                failure,
                policy.remaining_after(attempt)
            );

            let Some(delay) = policy.delay_after(attempt) else {
                error!("All {} connection attempts failed", attempt);
                self.set_state(ConnectionState::FailedPermanently);
                return Err(ConnectError::Exhausted {
                    attempts: attempt,
                    source: failure,
                });
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => {
                    warn!("Shutdown requested while waiting to reconnect");
                    self.set_state(ConnectionState::Disconnected);
                    return Err(ConnectError::Interrupted { attempts: attempt });
                }
            }
        }
    }

    /// Closes the held connection. Does nothing when not connected.
    pub async fn disconnect(&self) {
        self.release().await;
        self.set_state(ConnectionState::Disconnected);
    }

    async fn release(&self) {
        let connection = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(connection) = connection {
            self.connector.close(connection).await;
            info!("Datastore disconnected");
        }
    }

    fn store_connection(&self, connection: C::Connection) {
        *self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(connection);
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }
}
