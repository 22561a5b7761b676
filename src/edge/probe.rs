//! Pluggable health probes.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::edge::node::EdgeNode;

/// Result of one liveness check.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOutcome {
    pub healthy: bool,
    pub response_time_ms: u64,
}

/// A liveness check against one edge node.
///
/// Probes run on the monitor's blocking cycle, off the request path.
pub trait HealthProbe: Send + Sync {
    fn probe(&self, node: &EdgeNode) -> ProbeOutcome;
}

/// Real reachability check: a TCP connect with a timeout. This is the
/// default probe for loaded configurations.
#[derive(Debug)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl HealthProbe for TcpProbe {
    fn probe(&self, node: &EdgeNode) -> ProbeOutcome {
        let started = Instant::now();
        let addr = match (node.host.as_str(), node.port).to_socket_addrs() {
            Ok(mut addrs) => addrs.next(),
            Err(_) => None,
        };
        let healthy = match addr {
            Some(addr) => TcpStream::connect_timeout(&addr, self.timeout).is_ok(),
            None => false,
        };
        ProbeOutcome {
            healthy,
            response_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Biased random stand-in for a real reachability check. Demo and test
/// use only; never a production probe.
#[derive(Debug)]
pub struct SimulatedProbe {
    uptime_percent: u32,
}

impl SimulatedProbe {
    pub fn new(uptime_percent: u32) -> Self {
        Self {
            uptime_percent: uptime_percent.min(100),
        }
    }
}

impl Default for SimulatedProbe {
    fn default() -> Self {
        Self::new(90)
    }
}

impl HealthProbe for SimulatedProbe {
    fn probe(&self, _node: &EdgeNode) -> ProbeOutcome {
        let mut rng = rand::thread_rng();
        ProbeOutcome {
            healthy: rng.gen_range(0..100) < self.uptime_percent,
            response_time_ms: rng.gen_range(20..80),
        }
    }
}
