//! End-to-end tests: real listener, real dataset file, real HTTP client

use region_latency_stats::{
    dataset,
    logging::Logger,
    server::{self, AppState},
};
use serde_json::{json, Value};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<region_latency_stats::Result<()>>,
}

impl TestServer {
    async fn start(data_file: &std::path::Path) -> Self {
        let logger = Logger::disabled("DATA");
        let table = Arc::new(dataset::load_or_empty(data_file, &logger).await);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(server::serve(listener, AppState::silent(table), async {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

fn telemetry_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let data = json!([
        {"region": "apac", "service": "analytics", "latency_ms": 120.5, "uptime_pct": 99.12, "timestamp": 1},
        {"region": "apac", "service": "checkout", "latency_ms": 190.25, "uptime_pct": 98.44, "timestamp": 2},
        {"region": "emea", "service": "catalog", "latency_ms": 160.0, "uptime_pct": 99.5, "timestamp": 3},
        {"region": "apac", "service": "support", "latency_ms": 210.75, "uptime_pct": 97.9, "timestamp": 4}
    ]);
    file.write_all(data.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn serves_statistics_from_file() {
    let file = telemetry_file();
    let server = TestServer::start(file.path()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url())
        .json(&json!({"regions": ["apac", "amer", "emea"], "threshold_ms": 180}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let regions = body["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 2);

    assert_eq!(regions[0]["region"], "apac");
    assert_eq!(regions[0]["avg_latency"], 173.83);
    assert_eq!(regions[0]["breaches"], 2);
    assert_eq!(regions[1]["region"], "emea");
    assert_eq!(regions[1]["p95_latency"], 160.0);
    assert_eq!(regions[1]["breaches"], 0);

    server.stop().await;
}

#[tokio::test]
async fn root_endpoint_over_http() {
    let file = telemetry_file();
    let server = TestServer::start(file.path()).await;

    let body: Value = reqwest::get(server.url()).await.unwrap().json().await.unwrap();
    assert_eq!(body["message"], "API is running. Use a POST request to get statistics.");

    server.stop().await;
}

#[tokio::test]
async fn missing_file_degrades_to_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(&dir.path().join("q-vercel-latency.json")).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client
            .post(server.url())
            .json(&json!({"regions": ["apac"], "threshold_ms": 180}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Server is missing the telemetry data file."}));
    }

    // GET keeps working in degraded mode
    let response = reqwest::get(server.url()).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn concurrent_requests_share_the_table() {
    let file = telemetry_file();
    let server = TestServer::start(file.path()).await;
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let client = client.clone();
        let url = server.url();
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"regions": ["apac"], "threshold_ms": 200}))
                .send()
                .await
                .unwrap()
                .json::<Value>()
                .await
                .unwrap()
        }));
    }

    let mut bodies = Vec::new();
    for task in tasks {
        bodies.push(task.await.unwrap());
    }
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(bodies[0]["regions"][0]["breaches"], 1);

    server.stop().await;
}
