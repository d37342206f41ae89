//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

use edge_gateway::config::GatewayConfig;
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::routing::RouteTable;
use edge_gateway::GatewayServer;

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Log of requests that reached the mock upstream.
#[derive(Debug, Clone, Default)]
pub struct UpstreamLog(Arc<Mutex<Vec<Captured>>>);

impl UpstreamLog {
    pub fn calls(&self) -> Vec<Captured> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

/// Start a programmable mock upstream. `respond` picks status and body per request.
pub async fn start_mock_upstream<F>(respond: F) -> (SocketAddr, UpstreamLog)
where
    F: Fn(&Captured) -> (u16, &'static str, &'static str) + Send + Sync + 'static,
{
    let log = UpstreamLog::default();
    let respond = Arc::new(respond);

    let app_log = log.clone();
    let app = Router::new().fallback(move |request: Request<Body>| {
        let log = app_log.clone();
        let respond = respond.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, 1024 * 1024).await.unwrap_or_default();
            let captured = Captured {
                method: parts.method,
                path_and_query: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default(),
                headers: parts.headers,
                body: body.to_vec(),
            };
            let (status, content_type, body) = respond(&captured);
            log.0.lock().unwrap().push(captured);

            let mut response: Response = (
                StatusCode::from_u16(status).unwrap(),
                [("content-type", content_type), ("access-control-allow-origin", "https://upstream.example")],
                body,
            )
                .into_response();
            response.headers_mut().insert("x-upstream", "mock".parse().unwrap());
            response
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, log)
}

/// Mock upstream that sleeps before answering.
pub async fn start_slow_upstream(delay: Duration) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "late"
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Gateway configuration pointing at `upstream`.
pub fn config_for(upstream: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.origin = upstream.to_string();
    config.upstream.bearer_token = "test-token".into();
    config
}

/// A running gateway. Shuts down on drop.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let server = GatewayServer::new(config).expect("gateway should build");
    serve(server).await
}

pub async fn spawn_gateway_with_routes(config: GatewayConfig, routes: RouteTable) -> TestGateway {
    let server = GatewayServer::with_routes(config, routes).expect("gateway should build");
    serve(server).await
}

async fn serve(server: GatewayServer) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    TestGateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Assert the gateway's default CORS set is present.
pub fn assert_cors(headers: &reqwest::header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, PATCH, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "content-type, authorization, x-requested-with, secure"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}
