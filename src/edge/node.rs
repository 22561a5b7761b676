//! Edge node state and registry.
//!
//! # Responsibilities
//! - Represent one edge node with its live health/load fields
//! - Least-loaded lookup for the balancer (first-found tie break)
//! - Point-in-time snapshots for the status endpoints

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EdgeNodeConfig;

/// Load scores live on a fixed 0..=100 scale; lower is more available.
pub const LOAD_SCORE_FLOOR: i64 = 0;
pub const LOAD_SCORE_CEILING: i64 = 100;

/// Role of a node in the registry. Exactly one node is the primary:
/// the serving process itself, which is never probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Primary,
    Secondary,
}

/// One known edge node.
///
/// Health and load fields are independently atomic: the health monitor
/// writes them on its cycle, routing reads them (and bumps the load score
/// on dispatch) without any lock.
#[derive(Debug)]
pub struct EdgeNode {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub role: NodeRole,
    /// Administratively enabled. Nodes only leave the registry by
    /// explicit administrative action.
    pub active: bool,

    healthy: AtomicBool,
    load_score: AtomicI64,
    response_time_ms: AtomicU64,
    active_connections: AtomicU64,
    /// Unix seconds of the most recent probe (or startup).
    last_health_check: AtomicI64,
}

impl EdgeNode {
    pub fn from_config(config: &EdgeNodeConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            host: config.host.clone(),
            port: config.port,
            role: config.role,
            active: config.active,
            healthy: AtomicBool::new(true),
            load_score: AtomicI64::new(config.initial_load),
            response_time_ms: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            last_health_check: AtomicI64::new(Utc::now().timestamp()),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role == NodeRole::Primary
    }

    /// Eligible as a redirect target: healthy, enabled, and not this
    /// process itself.
    pub fn is_available(&self) -> bool {
        self.active && !self.is_primary() && self.healthy()
    }

    pub fn healthy(&self) -> bool {
        // The primary is the serving process; if we can answer, it is live.
        self.is_primary() || self.healthy.load(Ordering::Relaxed)
    }

    pub fn load_score(&self) -> i64 {
        self.load_score.load(Ordering::Relaxed)
    }

    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Record a redirect dispatched to this node. Returns the score after
    /// the penalty, for the `X-Load-Score` response header.
    pub fn record_dispatch(&self, penalty: i64) -> i64 {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        self.load_score.fetch_add(penalty, Ordering::Relaxed) + penalty
    }

    /// Apply a probe outcome. Returns the previous health state so the
    /// monitor can log transitions.
    pub fn apply_probe(&self, healthy: bool, response_time_ms: u64, at: DateTime<Utc>) -> bool {
        let was_healthy = self.healthy.swap(healthy, Ordering::Relaxed);
        self.response_time_ms
            .store(response_time_ms, Ordering::Relaxed);
        self.last_health_check.store(at.timestamp(), Ordering::Relaxed);
        was_healthy
    }

    /// Decay the score toward the floor (healthy node).
    pub fn decay_load(&self, step: i64) {
        let _ = self
            .load_score
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| {
                Some((s - step).max(LOAD_SCORE_FLOOR))
            });
    }

    /// Raise the score toward the ceiling (unhealthy node).
    pub fn raise_load(&self, step: i64) {
        let _ = self
            .load_score
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| {
                Some((s + step).min(LOAD_SCORE_CEILING))
            });
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        let checked_at = DateTime::<Utc>::from_timestamp(
            self.last_health_check.load(Ordering::Relaxed),
            0,
        )
        .unwrap_or_default();
        NodeSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            ip: self.host.clone(),
            port: self.port,
            role: self.role,
            healthy: self.healthy(),
            load_score: self.load_score(),
            response_time_ms: self.response_time_ms.load(Ordering::Relaxed),
            active_connections: self.active_connections(),
            last_health_check: checked_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Per-node view rendered into the JSON status payloads.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub role: NodeRole,
    pub healthy: bool,
    pub load_score: i64,
    pub response_time_ms: u64,
    pub active_connections: u64,
    pub last_health_check: String,
}

/// Ordered, fixed set of edge nodes, built once at startup.
#[derive(Debug, Default)]
pub struct EdgeRegistry {
    nodes: Vec<Arc<EdgeNode>>,
}

impl EdgeRegistry {
    pub fn from_config(configs: &[EdgeNodeConfig]) -> Self {
        Self {
            nodes: configs
                .iter()
                .map(|c| Arc::new(EdgeNode::from_config(c)))
                .collect(),
        }
    }

    pub fn nodes(&self) -> &[Arc<EdgeNode>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn healthy_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.healthy()).count()
    }

    /// Available node with the numerically lowest load score. Ties go to
    /// the node appearing first in registry order.
    pub fn least_loaded(&self) -> Option<Arc<EdgeNode>> {
        let mut best: Option<&Arc<EdgeNode>> = None;
        for node in &self.nodes {
            if !node.is_available() {
                continue;
            }
            match best {
                Some(b) if node.load_score() >= b.load_score() => {}
                _ => best = Some(node),
            }
        }
        best.cloned()
    }

    pub fn snapshots(&self) -> Vec<NodeSnapshot> {
        self.nodes.iter().map(|n| n.snapshot()).collect()
    }
}
