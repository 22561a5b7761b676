//! End-to-end tests driving a real listener over TCP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use shopfront::catalog::MemoryCatalog;
use shopfront::config::{EdgeNodeConfig, ServerConfig};
use shopfront::edge::{EdgeRegistry, NodeRole, SimulatedProbe};
use shopfront::lifecycle::Shutdown;
use shopfront::metrics::PerfCounters;
use shopfront::server::Server;

fn base_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    // Probes must not touch node state while tests assert on it.
    config.health.enabled = false;
    config.edge_nodes = vec![primary()];
    config
}

fn primary() -> EdgeNodeConfig {
    EdgeNodeConfig {
        id: "primary-server".into(),
        name: "Primary Server".into(),
        host: "127.0.0.1".into(),
        port: 8080,
        role: NodeRole::Primary,
        active: true,
        initial_load: 0,
    }
}

fn secondary(id: &str, host: &str, port: u16, load: i64) -> EdgeNodeConfig {
    EdgeNodeConfig {
        id: id.into(),
        name: id.into(),
        host: host.into(),
        port,
        role: NodeRole::Secondary,
        active: true,
        initial_load: load,
    }
}

async fn start_server(
    config: ServerConfig,
) -> (SocketAddr, Shutdown, Arc<PerfCounters>, Arc<EdgeRegistry>) {
    let server = Server::bind(
        config,
        MemoryCatalog::demo(),
        Arc::new(SimulatedProbe::default()),
    )
    .await
    .expect("bind test server");

    let addr = server.local_addr();
    let counters = server.counters();
    let registry = server.registry();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        server.run(&server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown, counters, registry)
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_monotonic_counters() {
    let (addr, shutdown, counters, _) = start_server(base_config()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/health");

    let mut previous = 0u64;
    for i in 0..5u64 {
        let res = client.get(&url).send().await.unwrap();
        assert_eq!(res.status(), 200);

        let payload: serde_json::Value = res.json().await.unwrap();
        assert_eq!(payload["status"], "OK");

        let total = payload["performance"]["total_requests"].as_u64().unwrap();
        // Never more than the requests completed before this one, never
        // going backwards.
        assert!(total <= i, "request {i} reported {total}");
        assert!(total >= previous);
        previous = total;
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(counters.total_requests(), 5);
    shutdown.trigger();
}

#[tokio::test]
async fn unmapped_path_returns_html_404() {
    let (addr, shutdown, _, _) = start_server(base_config()).await;

    let res = reqwest::get(format!("http://{addr}/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(
        res.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/html"
    );
    let declared: usize = res
        .headers()
        .get("content-length")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    let body = res.text().await.unwrap();
    assert!(!body.is_empty());
    assert_eq!(declared, body.len());
    assert!(body.contains("404"));

    shutdown.trigger();
}

#[tokio::test]
async fn redirects_flip_to_the_other_node_as_penalties_accumulate() {
    let mut config = base_config();
    config.edge_nodes.push(secondary("edge-a", "192.168.18.22", 8081, 10));
    config.edge_nodes.push(secondary("edge-b", "192.168.18.160", 8082, 40));

    let (addr, shutdown, _, registry) = start_server(config).await;
    let client = no_redirect_client();
    let url = format!("http://{addr}/products");

    // Scores: a=10,b=40. Four dispatches at +10 each go to edge-a (the
    // 40-40 tie breaks by registry order), pushing it to 50.
    for expected_score in [20, 30, 40, 50] {
        let res = client.get(&url).send().await.unwrap();
        assert_eq!(res.status(), 302);
        assert_eq!(
            res.headers().get("x-edge-node").unwrap().to_str().unwrap(),
            "edge-a"
        );
        assert_eq!(
            res.headers().get("x-load-score").unwrap().to_str().unwrap(),
            expected_score.to_string()
        );
        assert_eq!(
            res.headers().get("location").unwrap().to_str().unwrap(),
            "http://192.168.18.22:8081/products"
        );
    }

    // edge-a now carries 50, so edge-b (40) wins.
    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 302);
    assert_eq!(
        res.headers().get("x-edge-node").unwrap().to_str().unwrap(),
        "edge-b"
    );
    assert_eq!(
        res.headers().get("location").unwrap().to_str().unwrap(),
        "http://192.168.18.160:8082/products"
    );

    let loads: Vec<i64> = registry.nodes().iter().map(|n| n.load_score()).collect();
    assert_eq!(loads, vec![0, 50, 50]);

    shutdown.trigger();
}

#[tokio::test]
async fn zero_connection_ceiling_closes_without_response() {
    let mut config = base_config();
    config.listener.max_connections = 0;

    let (addr, shutdown, counters, _) = start_server(config).await;

    for _ in 0..3 {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        // The write may race the server-side close; either way no
        // response bytes ever come back.
        let _ = stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: x\r\n\r\n")
            .await;

        let mut response = Vec::new();
        let _ = stream.read_to_end(&mut response).await;
        assert!(response.is_empty(), "rejected connection wrote bytes");
    }

    assert_eq!(counters.active_connections(), 0);
    assert_eq!(counters.total_requests(), 0);
    shutdown.trigger();
}

#[tokio::test]
async fn concurrent_health_requests_all_succeed() {
    let (addr, shutdown, counters, _) = start_server(base_config()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/health");

    let total_issued = 20u64;
    let mut tasks = Vec::new();
    for _ in 0..total_issued {
        let client = client.clone();
        let url = url.clone();
        tasks.push(tokio::spawn(async move {
            let res = client.get(&url).send().await.unwrap();
            assert_eq!(res.status(), 200);
            let payload: serde_json::Value = res.json().await.unwrap();
            payload["performance"]["total_requests"].as_u64().unwrap()
        }));
    }

    for task in tasks {
        let reported = task.await.unwrap();
        // No response may claim more completed requests than were issued.
        assert!(reported < total_issued);
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(counters.total_requests(), total_issued);
    assert_eq!(counters.active_connections(), 0);
    shutdown.trigger();
}

#[tokio::test]
async fn status_endpoint_lists_nodes() {
    let mut config = base_config();
    config.edge_nodes.push(secondary("edge-a", "192.168.18.22", 8081, 25));

    let (addr, shutdown, _, registry) = start_server(config).await;

    // Mark the secondary unhealthy so the request is served locally and
    // the payload reflects the state.
    registry.nodes()[1].apply_probe(false, 12, chrono::Utc::now());

    let res = reqwest::get(format!("http://{addr}/status")).await.unwrap();
    assert_eq!(res.status(), 200);
    let payload: serde_json::Value = res.json().await.unwrap();

    assert_eq!(payload["status"], "operational");
    let nodes = payload["edge_nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["type"], "primary");
    assert_eq!(nodes[0]["healthy"], true);
    assert_eq!(nodes[1]["id"], "edge-a");
    assert_eq!(nodes[1]["healthy"], false);
    assert_eq!(nodes[1]["response_time_ms"], 12);

    shutdown.trigger();
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let (addr, shutdown, _, _) = start_server(base_config()).await;

    let res = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The listener is gone once the acceptor exits.
    let after = reqwest::Client::builder()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap()
        .get(format!("http://{addr}/health"))
        .send()
        .await;
    assert!(after.is_err());
}
