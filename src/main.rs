//! Storefront edge-serving binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront::catalog::MemoryCatalog;
use shopfront::config::load_config;
use shopfront::edge::{HealthProbe, SimulatedProbe, TcpProbe};
use shopfront::lifecycle::Shutdown;
use shopfront::server::Server;

#[derive(Debug, Parser)]
#[command(name = "shopfront", version, about = "Storefront edge-serving core")]
struct Args {
    /// Path to a TOML configuration file. Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the biased-random health probe instead of real TCP probes.
    /// Demo use only.
    #[arg(long)]
    simulated_probes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Startup errors are fatal before any connection is accepted.
    let config = load_config(args.config.as_deref())?;

    // RUST_LOG wins over the configured level when set.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("shopfront={}", config.observability.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "shopfront starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        workers = config.workers.count,
        max_connections = config.listener.max_connections,
        edge_nodes = config.edge_nodes.len(),
        "Configuration loaded"
    );

    let probe: Arc<dyn HealthProbe> = if args.simulated_probes {
        tracing::warn!("Using simulated health probes; node health is random");
        Arc::new(SimulatedProbe::default())
    } else {
        Arc::new(TcpProbe::new(Duration::from_millis(
            config.health.probe_timeout_ms,
        )))
    };

    let server = Server::bind(config, MemoryCatalog::demo(), probe).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    server.run(&shutdown).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
