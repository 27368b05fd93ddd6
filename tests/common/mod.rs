//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderMap,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use nats_http_bridge::lifecycle::StartupError;
use nats_http_bridge::transport::MemoryBus;
use nats_http_bridge::worker::WorkerIdentity;
use nats_http_bridge::{Bridge, BridgeConfig, ResponseEnvelope, Shutdown};

pub const SUBJECT: &str = "http.requests";
pub const ERROR_SUBJECT: &str = "error";
pub const WORKER_NAME: &str = "test-host";

/// Start a stub HTTP server on an ephemeral port.
///
/// - `GET /ok` answers `pong`
/// - `/echo` answers `echo`, repeating every `X-Trace` request header
/// - `/body` answers with the request body
/// - `/slow` answers `late` after 200ms
pub async fn start_stub_server() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { "pong" }))
        .route("/echo", any(echo_headers))
        .route("/body", any(|body: String| async move { body }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "late"
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn echo_headers(headers: HeaderMap) -> (HeaderMap, &'static str) {
    let mut echoed = HeaderMap::new();
    for value in headers.get_all("x-trace") {
        echoed.append("x-trace", value.clone());
    }
    (echoed, "echo")
}

/// An address nothing listens on.
pub fn unreachable_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A bridge running over an in-memory bus.
pub struct Harness {
    pub bus: MemoryBus,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), StartupError>>,
}

impl Harness {
    pub async fn start(configure: impl FnOnce(&mut BridgeConfig)) -> Self {
        let mut config = BridgeConfig::default();
        config.transport.subject = SUBJECT.into();
        config.transport.queue_group = "bridges".into();
        config.http.use_system_proxy = false;
        configure(&mut config);

        let bus = MemoryBus::new();
        let shutdown = Shutdown::new();
        let bridge = Bridge::new(config, Arc::new(bus.clone()), WorkerIdentity::new(WORKER_NAME)).unwrap();
        let task = tokio::spawn(bridge.run(shutdown.subscribe()));

        for _ in 0..100 {
            if bus.subscriber_count(SUBJECT) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(bus.subscriber_count(SUBJECT), 1, "bridge did not subscribe");

        Self { bus, shutdown, task }
    }

    pub fn send(&self, reply: &str, payload: impl Into<String>) {
        self.bus.publish_request(SUBJECT, reply, payload.into());
    }

    /// Wait for exactly one response on `reply`.
    pub async fn response(&self, reply: &str) -> ResponseEnvelope {
        let published = self.bus.wait_for(reply, 1, Duration::from_secs(5)).await;
        assert_eq!(published.len(), 1, "expected one response on {}", reply);
        serde_json::from_slice(&published[0]).unwrap()
    }

    /// Wait for `count` error reports.
    pub async fn errors(&self, count: usize) -> Vec<serde_json::Value> {
        self.bus
            .wait_for(ERROR_SUBJECT, count, Duration::from_secs(5))
            .await
            .iter()
            .map(|payload| serde_json::from_slice(payload).unwrap())
            .collect()
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("bridge should stop")
            .unwrap()
            .unwrap();
    }
}
