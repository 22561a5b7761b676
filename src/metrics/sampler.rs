//! Derived request-rate sampling.

use std::sync::Mutex;
use std::time::Instant;

/// Derives requests-per-second from the delta between the current
/// `total_requests` value and the one recorded at the previous call.
///
/// A single shared sample is updated on every call, so concurrent callers
/// race on the derived value. The rate is best-effort, not exact.
#[derive(Debug)]
pub struct RpsSampler {
    last: Mutex<Sample>,
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Instant,
    total_requests: u64,
}

impl RpsSampler {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(Sample {
                at: Instant::now(),
                total_requests: 0,
            }),
        }
    }

    /// Compute the rate since the previous sample and advance it.
    ///
    /// Returns 0.0 when called again within the same wall-clock second,
    /// leaving the previous sample in place.
    pub fn sample(&self, total_requests: u64) -> f64 {
        let now = Instant::now();
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let elapsed = now.duration_since(last.at).as_secs_f64();
        if elapsed < 1.0 {
            return 0.0;
        }

        let delta = total_requests.saturating_sub(last.total_requests);
        *last = Sample {
            at: now,
            total_requests,
        };
        delta as f64 / elapsed
    }
}

impl Default for RpsSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rate_from_delta() {
        let sampler = RpsSampler::new();
        // Inside the same second: no new sample yet.
        assert_eq!(sampler.sample(10), 0.0);

        std::thread::sleep(Duration::from_millis(1100));
        let rate = sampler.sample(10);
        // 10 requests over ~1.1s.
        assert!(rate > 5.0 && rate < 10.0, "rate was {rate}");

        std::thread::sleep(Duration::from_millis(1100));
        // No new requests since the last sample.
        assert_eq!(sampler.sample(10), 0.0);
    }

    #[test]
    fn counter_below_last_sample_yields_zero() {
        let sampler = RpsSampler::new();
        std::thread::sleep(Duration::from_millis(1100));
        assert!(sampler.sample(5) > 0.0);

        std::thread::sleep(Duration::from_millis(1100));
        // A stale reading smaller than the last sample must not underflow.
        assert_eq!(sampler.sample(3), 0.0);
    }
}
