//! Storefront edge-serving core.
//!
//! A hand-rolled HTTP/1.1 serving layer: raw TCP accept loop with a hard
//! concurrency ceiling, a fixed worker pool on a bounded queue, a
//! request/response codec, an edge-node registry with background health
//! monitoring, and a redirect-based least-load balancer. Status endpoints
//! expose process-wide atomic performance counters as JSON.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Traffic management
pub mod edge;

// Storefront glue
pub mod cache;
pub mod catalog;
pub mod handlers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod metrics;

pub mod server;

pub use config::ServerConfig;
pub use lifecycle::Shutdown;
pub use server::Server;
