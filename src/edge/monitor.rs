//! Background health monitoring.
//!
//! # Responsibilities
//! - Probe every non-primary node on a fixed interval
//! - Log health-state transitions
//! - Adjust load scores with hysteresis (decay when healthy, step up
//!   when unhealthy) so a single probe never swings routing to an extreme

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::{BalancerConfig, HealthConfig};
use crate::edge::node::EdgeRegistry;
use crate::edge::probe::HealthProbe;

pub struct HealthMonitor {
    registry: Arc<EdgeRegistry>,
    probe: Arc<dyn HealthProbe>,
    config: HealthConfig,
    tuning: BalancerConfig,
}

impl HealthMonitor {
    pub fn new(
        registry: Arc<EdgeRegistry>,
        probe: Arc<dyn HealthProbe>,
        config: HealthConfig,
        tuning: BalancerConfig,
    ) -> Self {
        Self {
            registry,
            probe,
            config,
            tuning,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Health monitoring disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.config.interval_secs,
            nodes = self.registry.len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        // The immediate first tick would re-probe nodes seeded at startup.
        ticker.tick().await;

        let monitor = Arc::new(self);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let monitor = Arc::clone(&monitor);
                    // Probes may block (connect timeouts); keep them off
                    // the runtime's async workers.
                    let cycle = tokio::task::spawn_blocking(move || monitor.run_cycle());
                    if cycle.await.is_err() {
                        tracing::error!("Health check cycle panicked");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One full probe pass over the registry. The primary node is the
    /// serving process itself and is skipped.
    pub fn run_cycle(&self) {
        for node in self.registry.nodes() {
            if node.is_primary() || !node.active {
                continue;
            }

            let outcome = self.probe.probe(node);
            let now = Utc::now();
            let was_healthy = node.apply_probe(outcome.healthy, outcome.response_time_ms, now);

            if was_healthy != outcome.healthy {
                if outcome.healthy {
                    tracing::info!(node = %node.name, "Edge node recovered");
                } else {
                    tracing::warn!(node = %node.name, "Edge node became unhealthy");
                }
            }

            if outcome.healthy {
                node.decay_load(self.tuning.healthy_decay);
            } else {
                node.raise_load(self.tuning.unhealthy_step);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeNodeConfig;
    use crate::edge::node::{NodeRole, LOAD_SCORE_CEILING};
    use crate::edge::probe::ProbeOutcome;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Probe returning a fixed outcome.
    struct FixedProbe {
        healthy: AtomicBool,
    }

    impl FixedProbe {
        fn new(healthy: bool) -> Self {
            Self {
                healthy: AtomicBool::new(healthy),
            }
        }

        fn set_healthy(&self, healthy: bool) {
            self.healthy.store(healthy, Ordering::Relaxed);
        }
    }

    impl HealthProbe for FixedProbe {
        fn probe(&self, _node: &crate::edge::node::EdgeNode) -> ProbeOutcome {
            ProbeOutcome {
                healthy: self.healthy.load(Ordering::Relaxed),
                response_time_ms: 7,
            }
        }
    }

    fn monitor_with(
        nodes: &[EdgeNodeConfig],
        probe: Arc<FixedProbe>,
    ) -> (Arc<EdgeRegistry>, HealthMonitor) {
        let registry = Arc::new(EdgeRegistry::from_config(nodes));
        let monitor = HealthMonitor::new(
            Arc::clone(&registry),
            probe,
            HealthConfig::default(),
            BalancerConfig::default(),
        );
        (registry, monitor)
    }

    fn secondary(id: &str, load: i64) -> EdgeNodeConfig {
        EdgeNodeConfig {
            id: id.into(),
            name: id.into(),
            host: "192.0.2.1".into(),
            port: 8081,
            role: NodeRole::Secondary,
            active: true,
            initial_load: load,
        }
    }

    fn primary() -> EdgeNodeConfig {
        EdgeNodeConfig {
            id: "primary-server".into(),
            name: "Primary".into(),
            host: "0.0.0.0".into(),
            port: 8080,
            role: NodeRole::Primary,
            active: true,
            initial_load: 0,
        }
    }

    #[test]
    fn unhealthy_flip_steps_load_by_configured_amount() {
        let probe = Arc::new(FixedProbe::new(false));
        let (registry, monitor) = monitor_with(&[primary(), secondary("edge-a", 25)], probe);

        monitor.run_cycle();

        let node = &registry.nodes()[1];
        assert!(!node.healthy());
        // Default unhealthy step is 20.
        assert_eq!(node.load_score(), 45);
    }

    #[test]
    fn repeated_failures_clamp_at_ceiling() {
        let probe = Arc::new(FixedProbe::new(false));
        let (registry, monitor) = monitor_with(&[secondary("edge-a", 95)], probe);

        monitor.run_cycle();
        monitor.run_cycle();

        assert_eq!(registry.nodes()[0].load_score(), LOAD_SCORE_CEILING);
    }

    #[test]
    fn healthy_nodes_decay_toward_floor() {
        let probe = Arc::new(FixedProbe::new(true));
        let (registry, monitor) = monitor_with(&[secondary("edge-a", 8)], probe);

        monitor.run_cycle(); // 8 -> 3 (default decay 5)
        monitor.run_cycle(); // 3 -> 0
        monitor.run_cycle(); // stays at floor

        assert_eq!(registry.nodes()[0].load_score(), 0);
        assert!(registry.nodes()[0].healthy());
    }

    #[test]
    fn recovery_is_observed_on_the_next_cycle() {
        let probe = Arc::new(FixedProbe::new(false));
        let (registry, monitor) = monitor_with(&[secondary("edge-a", 10)], Arc::clone(&probe));

        monitor.run_cycle();
        assert!(!registry.nodes()[0].healthy());

        probe.set_healthy(true);
        monitor.run_cycle();
        assert!(registry.nodes()[0].healthy());
    }

    #[test]
    fn primary_is_never_probed() {
        let probe = Arc::new(FixedProbe::new(false));
        let (registry, monitor) = monitor_with(&[primary()], probe);

        monitor.run_cycle();

        let node = &registry.nodes()[0];
        assert!(node.healthy());
        assert_eq!(node.load_score(), 0);
    }
}
