//! Performance counters and derived metrics.
//!
//! # Design Decisions
//! - Counters are independent atomics; no cross-counter snapshot atomicity
//! - Injected via `Arc`, never a process-wide singleton
//! - Derived rates (requests/sec) are best-effort under concurrency

pub mod counters;
pub mod sampler;

pub use counters::{ConnectionGuard, CounterSnapshot, PerfCounters};
pub use sampler::RpsSampler;
