//! Configuration management.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared with subsystems at startup, never re-read at runtime
//! ```
//!
//! # Design Decisions
//! - Every section has defaults so a minimal (or absent) config runs
//! - Validation separates syntactic (serde) from semantic checks
//! - Validation failure is fatal before any connection is accepted

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BalancerConfig, CacheConfig, EdgeNodeConfig, HealthConfig, ListenerConfig, ServerConfig,
    WorkerConfig,
};
