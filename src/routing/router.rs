//! Routing decisions and the local dispatch table.

use std::sync::Arc;

use crate::cache::PageCache;
use crate::catalog::ProductCatalog;
use crate::config::ServerConfig;
use crate::edge::{EdgeNode, EdgeRegistry};
use crate::handlers::{pages, status};
use crate::http::{Request, Response};
use crate::metrics::{PerfCounters, RpsSampler};

/// Paths always eligible for edge redirection, independent of node state.
fn is_routable_path(path: &str) -> bool {
    path == "/" || path == "/products" || path.starts_with("/static/")
}

/// Per-request routing: redirect to the least-loaded healthy edge node
/// when one exists, otherwise serve from the local handler table.
pub struct Router {
    registry: Arc<EdgeRegistry>,
    counters: Arc<PerfCounters>,
    catalog: Arc<dyn ProductCatalog>,
    cache: PageCache,
    sampler: RpsSampler,
    redirect_penalty: i64,
    max_connections: u64,
}

impl Router {
    pub fn new(
        config: &ServerConfig,
        registry: Arc<EdgeRegistry>,
        counters: Arc<PerfCounters>,
        catalog: Arc<dyn ProductCatalog>,
        cache: PageCache,
    ) -> Self {
        Self {
            registry,
            counters,
            catalog,
            cache,
            sampler: RpsSampler::new(),
            redirect_penalty: config.balancer.redirect_penalty,
            max_connections: config.listener.max_connections,
        }
    }

    pub fn handle(&self, request: &Request) -> Response {
        if let Some(node) = self.redirect_target(request) {
            return self.redirect_to(&node, request);
        }
        self.local(request)
    }

    /// A request is a redirect candidate when its path is in the routable
    /// set or when any healthy secondary exists; candidacy without an
    /// available node falls back to local processing.
    fn redirect_target(&self, request: &Request) -> Option<Arc<EdgeNode>> {
        let node = self.registry.least_loaded();
        if is_routable_path(&request.path) || node.is_some() {
            return node;
        }
        None
    }

    fn redirect_to(&self, node: &EdgeNode, request: &Request) -> Response {
        let score = node.record_dispatch(self.redirect_penalty);
        let location = format!("http://{}:{}{}", node.host, node.port, request.path);

        tracing::debug!(
            node = %node.id,
            load_score = score,
            path = %request.path,
            "Redirecting request to edge node"
        );

        Response::redirect(&location)
            .with_header("X-Edge-Node", &node.name)
            .with_header("X-Load-Score", score)
    }

    fn local(&self, request: &Request) -> Response {
        match request.path.as_str() {
            "/" | "/home" => pages::home(self.catalog.as_ref(), &self.cache),
            "/products" => pages::products(self.catalog.as_ref(), &self.cache),
            "/admin" => pages::admin(&self.counters, &self.registry),
            "/health" => status::health(&self.counters),
            "/status" => status::status(&self.counters, &self.registry),
            "/api/edge/status" => status::edge_status(&self.registry),
            "/api/performance" => status::performance(
                &self.counters,
                &self.registry,
                &self.sampler,
                self.max_connections,
            ),
            _ => Response::not_found(),
        }
    }
}
