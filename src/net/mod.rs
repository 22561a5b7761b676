//! TCP accept loop and worker-pool dispatch.
//!
//! # Data Flow
//! ```text
//! Acceptor ──(ceiling check)──▶ bounded queue ──▶ Worker
//!     Worker: read (deadline) → decode → route → encode → write → close
//! ```
//!
//! # Design Decisions
//! - Fail-fast at the ceiling: over-limit connections are closed
//!   immediately, never queued
//! - Fixed pool + bounded queue is the backpressure mechanism
//! - Every read/write carries a deadline; a stalled client cannot hold a
//!   worker indefinitely

pub mod acceptor;
pub mod dispatcher;

pub use acceptor::{AcceptError, Acceptor, Connection};
pub use dispatcher::Dispatcher;
