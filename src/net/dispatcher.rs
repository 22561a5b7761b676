//! Fixed worker pool over the bounded connection queue.
//!
//! # Responsibilities
//! - Spawn `workers.count` tasks sharing one queue receiver
//! - Per connection: bounded read with a deadline, decode, route, write,
//!   close
//! - Observe the shutdown broadcast: finish the in-flight exchange, stop
//!   dequeueing, exit

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::WorkerConfig;
use crate::http::{codec, Response};
use crate::lifecycle::Shutdown;
use crate::metrics::PerfCounters;
use crate::net::acceptor::Connection;
use crate::routing::Router;

pub struct Dispatcher {
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawn the worker pool. Workers run until the queue closes or the
    /// shutdown broadcast fires.
    pub fn spawn(
        config: &WorkerConfig,
        queue: mpsc::Receiver<Connection>,
        router: Arc<Router>,
        counters: Arc<PerfCounters>,
        shutdown: &Shutdown,
    ) -> Self {
        let queue = Arc::new(Mutex::new(queue));
        let mut workers = Vec::with_capacity(config.count);

        for worker_id in 0..config.count {
            let queue = Arc::clone(&queue);
            let router = Arc::clone(&router);
            let counters = Arc::clone(&counters);
            let config = config.clone();
            let mut shutdown = shutdown.subscribe();

            workers.push(tokio::spawn(async move {
                tracing::debug!(worker_id, "Worker started");
                loop {
                    let connection = tokio::select! {
                        conn = async { queue.lock().await.recv().await } => match conn {
                            Some(conn) => conn,
                            None => break,
                        },
                        _ = shutdown.recv() => break,
                    };
                    handle_connection(connection, &config, &router, &counters).await;
                }
                tracing::debug!(worker_id, "Worker stopped");
            }));
        }

        Self { workers }
    }

    /// Wait for every worker to exit.
    pub async fn join(self) {
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// One request/response exchange. The connection's counter guard drops at
/// the end of this function regardless of outcome.
async fn handle_connection(
    mut connection: Connection,
    config: &WorkerConfig,
    router: &Router,
    counters: &PerfCounters,
) {
    let deadline = Duration::from_millis(config.read_timeout_ms);
    let raw = match timeout(
        deadline,
        read_request(&mut connection.stream, config.max_request_bytes),
    )
    .await
    {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            tracing::debug!(peer_addr = %connection.peer, error = %e, "Read failed");
            return;
        }
        Err(_) => {
            tracing::debug!(peer_addr = %connection.peer, "Read deadline exceeded");
            return;
        }
    };

    // Connection closed without sending anything: abandon silently.
    if raw.is_empty() {
        return;
    }

    let response = match codec::decode(&raw, connection.peer) {
        Ok(request) => {
            tracing::debug!(
                peer_addr = %connection.peer,
                method = %request.method,
                path = %request.path,
                "Handling request"
            );
            router.handle(&request)
        }
        Err(e) => {
            tracing::debug!(peer_addr = %connection.peer, error = %e, "Protocol error");
            Response::bad_request()
        }
    };

    let bytes = codec::encode(&response);
    match timeout(deadline, connection.stream.write_all(&bytes)).await {
        Ok(Ok(())) => {
            counters.record_request();
            let _ = connection.stream.shutdown().await;
        }
        Ok(Err(e)) => {
            tracing::debug!(peer_addr = %connection.peer, error = %e, "Write failed");
        }
        Err(_) => {
            tracing::debug!(peer_addr = %connection.peer, "Write deadline exceeded");
        }
    }
}

/// Read one request off the socket: headers until the blank line, then
/// the body up to `Content-Length`, the whole buffer capped at
/// `max_request_bytes`. Bodies split across reads are reassembled.
async fn read_request(stream: &mut TcpStream, max_bytes: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8 * 1024);
    let mut chunk = [0u8; 8 * 1024];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(buf);
        }
        buf.extend_from_slice(&chunk[..n]);

        if buf.len() >= max_bytes {
            buf.truncate(max_bytes);
            return Ok(buf);
        }

        if let Some(head_end) = codec::header_section_end(&buf) {
            let declared = codec::declared_body_len(&buf[..head_end]);
            let separator = if buf[head_end..].starts_with(b"\r\n\r\n") { 4 } else { 2 };
            if buf.len() >= head_end + separator + declared {
                return Ok(buf);
            }
        }
    }
}
