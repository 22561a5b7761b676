//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::validate_config;

/// Startup configuration failure. Always fatal: the process exits before
/// accepting any connections.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Load and validate configuration. With no path, the built-in defaults
/// are used (still validated, for uniformity).
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServerConfig::default(),
    };

    validate_config(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let toml = r#"
            [listener]
            bind_address = "127.0.0.1:9000"
            max_connections = 64

            [[edge_nodes]]
            id = "primary-server"
            name = "Primary"
            host = "127.0.0.1"
            port = 9000
            role = "primary"

            [[edge_nodes]]
            id = "edge-a"
            name = "Edge A"
            host = "10.0.0.2"
            port = 9001
            role = "secondary"
            initial_load = 25
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_connections, 64);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.workers.count, 4);
        assert_eq!(config.balancer.redirect_penalty, 10);
        assert_eq!(config.edge_nodes.len(), 2);
        assert!(config.edge_nodes[1].active);

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn defaults_load_without_a_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.edge_nodes.len(), 3);
    }
}
