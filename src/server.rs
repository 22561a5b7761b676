//! Server assembly: wires the registry, counters, router, worker pool,
//! health monitor, and acceptor together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::cache::PageCache;
use crate::catalog::ProductCatalog;
use crate::config::ServerConfig;
use crate::edge::{EdgeRegistry, HealthMonitor, HealthProbe};
use crate::lifecycle::Shutdown;
use crate::metrics::PerfCounters;
use crate::net::{AcceptError, Acceptor, Dispatcher};
use crate::routing::Router;

pub struct Server {
    config: ServerConfig,
    registry: Arc<EdgeRegistry>,
    counters: Arc<PerfCounters>,
    router: Arc<Router>,
    probe: Arc<dyn HealthProbe>,
    acceptor: Acceptor,
    local_addr: SocketAddr,
}

impl Server {
    /// Build every subsystem and bind the listener. Any failure here is a
    /// startup error: the caller exits before a connection is accepted.
    pub async fn bind(
        config: ServerConfig,
        catalog: Arc<dyn ProductCatalog>,
        probe: Arc<dyn HealthProbe>,
    ) -> Result<Self, AcceptError> {
        let counters = Arc::new(PerfCounters::new());
        let registry = Arc::new(EdgeRegistry::from_config(&config.edge_nodes));
        let cache = PageCache::new(
            Duration::from_secs(config.cache.ttl_secs),
            Arc::clone(&counters),
        );
        let router = Arc::new(Router::new(
            &config,
            Arc::clone(&registry),
            Arc::clone(&counters),
            catalog,
            cache,
        ));

        let acceptor = Acceptor::bind(&config.listener, Arc::clone(&counters)).await?;
        let local_addr = acceptor.local_addr().map_err(|source| AcceptError::Bind {
            addr: config.listener.bind_address.clone(),
            source,
        })?;

        Ok(Self {
            config,
            registry,
            counters,
            router,
            probe,
            acceptor,
            local_addr,
        })
    }

    /// Address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn registry(&self) -> Arc<EdgeRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn counters(&self) -> Arc<PerfCounters> {
        Arc::clone(&self.counters)
    }

    /// Serve until the shutdown signal fires, then drain the worker pool.
    pub async fn run(self, shutdown: &Shutdown) {
        tracing::info!(
            address = %self.local_addr,
            workers = self.config.workers.count,
            max_connections = self.config.listener.max_connections,
            edge_nodes = self.registry.len(),
            "Server running"
        );

        let monitor = HealthMonitor::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.probe),
            self.config.health.clone(),
            self.config.balancer.clone(),
        );
        let monitor_handle = tokio::spawn(monitor.run(shutdown.subscribe()));

        let (queue_tx, queue_rx) = mpsc::channel(self.config.workers.queue_depth);
        let dispatcher = Dispatcher::spawn(
            &self.config.workers,
            queue_rx,
            Arc::clone(&self.router),
            Arc::clone(&self.counters),
            shutdown,
        );

        self.acceptor.run(queue_tx, shutdown.subscribe()).await;

        // Acceptor returned: the queue sender is dropped, workers drain
        // and exit.
        dispatcher.join().await;
        if let Err(e) = monitor_handle.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }

        tracing::info!("Server stopped");
    }
}
