//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. The
//! defaults describe a runnable demo storefront with one primary node and
//! two mobile edge nodes.

use serde::{Deserialize, Serialize};

use crate::edge::node::NodeRole;

/// Root configuration for the serving core.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection ceiling).
    pub listener: ListenerConfig,

    /// Worker pool configuration.
    pub workers: WorkerConfig,

    /// Load-balancer tuning constants.
    pub balancer: BalancerConfig,

    /// Health monitor settings.
    pub health: HealthConfig,

    /// Rendered-page cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Known edge nodes, created at startup and held for the process
    /// lifetime.
    pub edge_nodes: Vec<EdgeNodeConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            workers: WorkerConfig::default(),
            balancer: BalancerConfig::default(),
            health: HealthConfig::default(),
            cache: CacheConfig::default(),
            observability: ObservabilityConfig::default(),
            edge_nodes: default_edge_nodes(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Hard ceiling on concurrent connections. Connections accepted at
    /// the ceiling are closed immediately, never queued.
    pub max_connections: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker tasks consuming the connection queue.
    pub count: usize,

    /// Capacity of the bounded connection queue.
    pub queue_depth: usize,

    /// Deadline for reading one full request off a connection.
    pub read_timeout_ms: u64,

    /// Upper bound on the bytes read for a single request.
    pub max_request_bytes: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 4,
            queue_depth: 256,
            read_timeout_ms: 5_000,
            max_request_bytes: 64 * 1024,
        }
    }
}

/// Load-balancer tuning constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Score added to a node on every redirect dispatched to it.
    pub redirect_penalty: i64,

    /// Score subtracted per cycle while a node is healthy (floor 0).
    pub healthy_decay: i64,

    /// Score added per cycle while a node is unhealthy (ceiling 100).
    pub unhealthy_step: i64,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            redirect_penalty: 10,
            healthy_decay: 5,
            unhealthy_step: 20,
        }
    }
}

/// Health monitor settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Enable the background health monitor.
    pub enabled: bool,

    /// Seconds between probe cycles.
    pub interval_secs: u64,

    /// Timeout for one probe attempt.
    pub probe_timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            probe_timeout_ms: 2_000,
        }
    }
}

/// Rendered-page cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for cached pages, in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// One edge node, as declared in configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdgeNodeConfig {
    /// Unique node identifier.
    pub id: String,

    /// Display name for logs and status payloads.
    pub name: String,

    /// Node host (IP or hostname).
    pub host: String,

    /// Node port.
    pub port: u16,

    /// Role; exactly one node must be the primary.
    pub role: NodeRole,

    /// Administratively enabled.
    #[serde(default = "default_true")]
    pub active: bool,

    /// Starting load score (0..=100, lower is more available).
    #[serde(default)]
    pub initial_load: i64,
}

fn default_true() -> bool {
    true
}

fn default_edge_nodes() -> Vec<EdgeNodeConfig> {
    vec![
        EdgeNodeConfig {
            id: "primary-server".to_string(),
            name: "Primary Server".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            role: NodeRole::Primary,
            active: true,
            initial_load: 0,
        },
        EdgeNodeConfig {
            id: "vivo-mobile".to_string(),
            name: "Vivo Mobile Edge".to_string(),
            host: "192.168.18.22".to_string(),
            port: 8081,
            role: NodeRole::Secondary,
            active: true,
            initial_load: 25,
        },
        EdgeNodeConfig {
            id: "samsung-mobile".to_string(),
            name: "Samsung Mobile Edge".to_string(),
            host: "192.168.18.160".to_string(),
            port: 8082,
            role: NodeRole::Secondary,
            active: true,
            initial_load: 30,
        },
    ]
}
