//! JSON status surface.
//!
//! Field names are stable; clients and tests key off them:
//! `status`, `timestamp`, `performance{...}`, `edge_nodes[...]`.

use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::edge::EdgeRegistry;
use crate::http::Response;
use crate::metrics::{PerfCounters, RpsSampler};

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `/health`: liveness plus the four counters.
pub fn health(counters: &PerfCounters) -> Response {
    Response::json(&json!({
        "status": "OK",
        "timestamp": timestamp(),
        "server": "shopfront",
        "version": env!("CARGO_PKG_VERSION"),
        "performance": counters.snapshot(),
    }))
}

/// `/status`: liveness, per-node health and load, counters.
pub fn status(counters: &PerfCounters, registry: &EdgeRegistry) -> Response {
    Response::json(&json!({
        "status": "operational",
        "timestamp": timestamp(),
        "edge_nodes": registry.snapshots(),
        "performance": counters.snapshot(),
    }))
}

/// `/api/edge/status`: nodes plus a balancer summary.
pub fn edge_status(registry: &EdgeRegistry) -> Response {
    Response::json(&json!({
        "edge_nodes": registry.snapshots(),
        "load_balancer": {
            "strategy": "least_connections",
            "total_nodes": registry.len(),
            "healthy_nodes": registry.healthy_count(),
        },
    }))
}

/// `/api/performance`: derived metrics. The requests-per-second figure
/// comes from a shared last-sample delta and is best-effort.
pub fn performance(
    counters: &PerfCounters,
    registry: &EdgeRegistry,
    sampler: &RpsSampler,
    max_connections: u64,
) -> Response {
    let snap = counters.snapshot();
    let utilization = if max_connections == 0 {
        0.0
    } else {
        snap.active_connections as f64 / max_connections as f64 * 100.0
    };

    let load_distribution: serde_json::Map<String, serde_json::Value> = registry
        .nodes()
        .iter()
        .map(|n| (n.id.clone(), json!(n.load_score())))
        .collect();

    Response::json(&json!({
        "timestamp": timestamp(),
        "metrics": {
            "requests_per_second": sampler.sample(snap.total_requests),
            "cache_hit_rate": snap.cache_hit_rate(),
            "connection_utilization": utilization,
            "edge_node_load_distribution": load_distribution,
        },
    }))
}
