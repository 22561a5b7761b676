//! Edge-node registry, health monitoring, and load scoring.
//!
//! # Data Flow
//! ```text
//! config ──▶ EdgeRegistry (ordered, fixed for the process lifetime)
//!                 ▲                    ▲
//!      HealthMonitor (sole writer      Router (reader + load-score
//!      of healthy/load fields,         penalty on redirect dispatch)
//!      periodic probe cycle)
//! ```
//!
//! # Design Decisions
//! - Per-node atomic fields; no registry-wide lock on the routing path
//! - The primary node is the serving process itself: never probed,
//!   always healthy
//! - Probes are pluggable; the random variant exists for demos and tests

pub mod monitor;
pub mod node;
pub mod probe;

pub use monitor::HealthMonitor;
pub use node::{EdgeNode, EdgeRegistry, NodeRole, NodeSnapshot};
pub use probe::{HealthProbe, ProbeOutcome, SimulatedProbe, TcpProbe};
