//! Semantic configuration checks, run after deserialization.

use std::collections::HashSet;

use crate::config::schema::ServerConfig;
use crate::edge::node::NodeRole;

/// Check invariants serde cannot express. Returns every violation found,
/// not just the first.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.is_empty() {
        errors.push("listener.bind_address must not be empty".to_string());
    }
    if config.workers.count == 0 {
        errors.push("workers.count must be at least 1".to_string());
    }
    if config.workers.queue_depth == 0 {
        errors.push("workers.queue_depth must be at least 1".to_string());
    }
    if config.workers.read_timeout_ms == 0 {
        errors.push("workers.read_timeout_ms must be at least 1".to_string());
    }
    if config.workers.max_request_bytes == 0 {
        errors.push("workers.max_request_bytes must be at least 1".to_string());
    }
    // tokio::time::interval panics on a zero period.
    if config.health.interval_secs == 0 {
        errors.push("health.interval_secs must be at least 1".to_string());
    }

    let primaries = config
        .edge_nodes
        .iter()
        .filter(|n| n.role == NodeRole::Primary)
        .count();
    if primaries != 1 {
        errors.push(format!(
            "exactly one edge node must have role \"primary\", found {primaries}"
        ));
    }

    let mut seen = HashSet::new();
    for node in &config.edge_nodes {
        if node.id.is_empty() {
            errors.push("edge node ids must not be empty".to_string());
        } else if !seen.insert(node.id.as_str()) {
            errors.push(format!("duplicate edge node id \"{}\"", node.id));
        }
        if node.initial_load < 0 || node.initial_load > 100 {
            errors.push(format!(
                "edge node \"{}\": initial_load must be in 0..=100",
                node.id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
