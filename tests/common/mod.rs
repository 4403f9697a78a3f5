//! Shared utilities for end-to-end dispatcher tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::http::StatusCode;
use request_dispatcher::config::{DispatcherConfig, TlsConfig};
use request_dispatcher::http::{HandlerError, JsonMap, RequestDescriptor, Responder};
use request_dispatcher::lifecycle::Shutdown;
use request_dispatcher::routing::RouteTable;
use request_dispatcher::DispatchServer;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A dispatcher running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.task).await;
    }
}

/// Start a plain-HTTP dispatcher on 127.0.0.1 with an OS-assigned port.
pub async fn start_server(config: DispatcherConfig, routes: RouteTable) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = DispatchServer::new(config, routes);
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let task = tokio::spawn(async move {
        server.serve(listener, None, &server_shutdown).await.unwrap();
    });

    TestServer {
        addr,
        shutdown,
        task,
    }
}

/// Start a dispatcher serving plain HTTP and HTTPS from pre-bound loopback listeners.
///
/// Returns the server and the HTTPS address.
pub async fn start_tls_server(
    config: DispatcherConfig,
    routes: RouteTable,
    tls: &TlsConfig,
) -> (TestServer, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let tls_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let tls_addr = tls_listener.local_addr().unwrap();
    let rustls = request_dispatcher::net::load_tls_config(tls).await.unwrap();

    let server = DispatchServer::new(config, routes);
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let task = tokio::spawn(async move {
        server
            .serve(listener, Some((tls_listener, rustls)), &server_shutdown)
            .await
            .unwrap();
    });

    (
        TestServer {
            addr,
            shutdown,
            task,
        },
        tls_addr,
    )
}

/// Write a self-signed certificate for localhost/127.0.0.1 into `dir`.
pub fn self_signed(dir: &Path) -> TlsConfig {
    let rcgen::CertifiedKey { cert, signing_key } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])
            .unwrap();

    let cert_path = dir.join("cert.pem");
    let key_path = dir.join("key.pem");
    std::fs::write(&cert_path, cert.pem()).unwrap();
    std::fs::write(&key_path, signing_key.serialize_pem()).unwrap();

    TlsConfig {
        cert_path: cert_path.to_string_lossy().into_owned(),
        key_path: key_path.to_string_lossy().into_owned(),
    }
}

/// A loopback address that was free a moment ago.
pub fn free_addr() -> SocketAddr {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
}

/// Whether something accepts TCP connections on `addr`, retrying for up to a second.
pub async fn is_listening(addr: SocketAddr) -> bool {
    for _ in 0..20 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Client for the self-signed HTTPS listener.
pub fn tls_client() -> reqwest::Client {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Client that never reuses connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Echoes the normalized request back as JSON.
pub async fn echo(req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
    let mut map = JsonMap::new();
    map.insert("path".into(), Value::String(req.path));
    map.insert("method".into(), Value::String(req.method));
    map.insert("payload".into(), Value::Object(req.payload));
    map.insert("query".into(), serde_json::to_value(req.query)?);
    respond.json(StatusCode::OK, map);
    Ok(())
}

/// Panics before answering.
pub async fn explode(_req: RequestDescriptor, _respond: Responder) -> Result<(), HandlerError> {
    panic!("handler blew up");
}

/// Never answers within any reasonable timeout.
pub async fn stall(_req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
    tokio::time::sleep(Duration::from_secs(60)).await;
    respond.status(StatusCode::OK);
    Ok(())
}
