//! Request routing.
//!
//! # Data Flow
//! ```text
//! Request ──▶ redirect candidacy check
//!     ├─ candidate + available node ──▶ 302 to the least-loaded edge node
//!     └─ otherwise ──▶ local handler table (exact path match) ──▶ 404
//! ```
//!
//! # Design Decisions
//! - Redirect, not reverse proxy: the core never forwards bytes to an
//!   edge node, it tells the client where to go next
//! - Dispatching a redirect charges the node a fixed load penalty

pub mod router;

pub use router::Router;
