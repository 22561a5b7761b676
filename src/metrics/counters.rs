//! Process-wide atomic performance counters.
//!
//! # Responsibilities
//! - Track total requests served, active connections, cache hits/misses
//! - Enforce the connection ceiling at accept time (fail-fast)
//! - Provide point-in-time snapshots for the status endpoints

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// The four counters tracked by the serving core.
///
/// Each counter is independently atomic; readers may observe them at
/// slightly different instants. `total_requests` is monotonic,
/// `active_connections` moves both ways.
#[derive(Debug, Default)]
pub struct PerfCounters {
    total_requests: AtomicU64,
    active_connections: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request/response exchange.
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn active_connections(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Try to claim a connection slot under `max_connections`.
    ///
    /// Returns `None` when the ceiling is reached; the caller closes the
    /// connection immediately without queueing it. The returned guard
    /// releases the slot on drop, whatever the handling outcome.
    pub fn try_acquire_connection(
        self: &Arc<Self>,
        max_connections: u64,
    ) -> Option<ConnectionGuard> {
        let mut current = self.active_connections.load(Ordering::Relaxed);
        loop {
            if current >= max_connections {
                return None;
            }
            match self.active_connections.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
        Some(ConnectionGuard {
            counters: Arc::clone(self),
        })
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters, serialized into status payloads.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CounterSnapshot {
    pub total_requests: u64,
    pub active_connections: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl CounterSnapshot {
    /// Cache hit rate in percent; 0.0 when no cache traffic yet.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / total as f64 * 100.0
    }
}

/// RAII guard for one claimed connection slot.
#[derive(Debug)]
pub struct ConnectionGuard {
    counters: Arc<PerfCounters>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counters
            .active_connections
            .fetch_sub(1, Ordering::Relaxed);
    }
}
