//! Listening socket and accept loop.
//!
//! # Responsibilities
//! - Bind the configured address
//! - Accept connections; accept errors are logged, never fatal
//! - Enforce the connection ceiling (fail-fast close, no queueing)
//! - Hand admitted connections to the dispatch queue

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};

use crate::config::ListenerConfig;
use crate::metrics::{ConnectionGuard, PerfCounters};

#[derive(Debug, Error)]
pub enum AcceptError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

/// One admitted connection travelling through the queue. The guard keeps
/// the active-connections slot claimed until the worker finishes, on any
/// outcome.
pub struct Connection {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    pub guard: ConnectionGuard,
}

pub struct Acceptor {
    listener: TcpListener,
    counters: Arc<PerfCounters>,
    max_connections: u64,
}

impl Acceptor {
    pub async fn bind(
        config: &ListenerConfig,
        counters: Arc<PerfCounters>,
    ) -> Result<Self, AcceptError> {
        let listener = TcpListener::bind(&config.bind_address)
            .await
            .map_err(|source| AcceptError::Bind {
                addr: config.bind_address.clone(),
                source,
            })?;

        tracing::info!(
            address = %config.bind_address,
            max_connections = config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            listener,
            counters,
            max_connections: config.max_connections,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept until shutdown. Over-ceiling connections are dropped on the
    /// floor without a log line each (no log storms under load).
    pub async fn run(
        self,
        queue: mpsc::Sender<Connection>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = shutdown.recv() => {
                    tracing::info!("Acceptor received shutdown signal, no longer accepting");
                    break;
                }
            };

            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                    continue;
                }
            };

            let guard = match self.counters.try_acquire_connection(self.max_connections) {
                Some(guard) => guard,
                // At the ceiling: close immediately, do not queue.
                None => continue,
            };

            tracing::trace!(peer_addr = %peer, "Connection accepted");

            if queue
                .send(Connection {
                    stream,
                    peer,
                    guard,
                })
                .await
                .is_err()
            {
                // Dispatcher gone; we are shutting down.
                break;
            }
        }
    }
}
