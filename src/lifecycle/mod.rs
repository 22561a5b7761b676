//! Process lifecycle.
//!
//! Startup order: config → registry/counters → health monitor → worker
//! pool → acceptor. Shutdown clears the broadcast flag equivalent: the
//! acceptor stops accepting, workers finish in-flight exchanges and stop
//! dequeueing, the dispatcher joins them.

pub mod shutdown;

pub use shutdown::Shutdown;
