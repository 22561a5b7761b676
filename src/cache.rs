//! Rendered-page cache.
//!
//! A small TTL cache over rendered HTML bodies. Hits and misses feed the
//! corresponding performance counters; the status pages expose the rate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::metrics::PerfCounters;

#[derive(Debug, Clone)]
struct CacheEntry {
    body: Vec<u8>,
    content_type: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct PageCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    counters: Arc<PerfCounters>,
}

impl PageCache {
    pub fn new(ttl: Duration, counters: Arc<PerfCounters>) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            counters,
        }
    }

    /// Fetch a live entry, recording a hit or a miss. Expired entries are
    /// removed on access.
    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                self.counters.record_cache_hit();
                Some((entry.body.clone(), entry.content_type.clone()))
            }
            Some(_) => {
                entries.remove(key);
                self.counters.record_cache_miss();
                None
            }
            None => {
                self.counters.record_cache_miss();
                None
            }
        }
    }

    pub fn put(&self, key: &str, body: Vec<u8>, content_type: &str) {
        self.lock().insert(
            key.to_string(),
            CacheEntry {
                body,
                content_type: content_type.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
