//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router whose single fallback is the dispatch pipeline
//! - Wire up middleware (tracing, request ID)
//! - Bind the plain HTTP listener and, outside production, the HTTPS one
//! - Run normalize → collect body → dispatch → emit for every request
//! - Stop both listeners on shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::DispatcherConfig;
use crate::http::body::{collect_body, BodyError};
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{normalize_method, normalize_path};
use crate::http::response::{emit, HandlerResult};
use crate::lifecycle::Shutdown;
use crate::net::tls::{load_tls_config, TlsError};
use crate::routing::RouteTable;

/// Header carrying the per-request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Time in-flight TLS connections get to finish after shutdown.
const TLS_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub max_body_size: usize,
}

/// Plain and TLS listeners sharing one dispatch pipeline.
pub struct DispatchServer {
    router: Router,
    config: DispatcherConfig,
}

impl DispatchServer {
    /// Create a new server with the given configuration and routes.
    pub fn new(config: DispatcherConfig, routes: RouteTable) -> Self {
        let dispatcher = Dispatcher::new(
            routes,
            Duration::from_millis(config.limits.handler_timeout_ms),
        );
        let state = AppState {
            dispatcher,
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router serving both listeners.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured listeners and serve until shutdown.
    pub async fn run(self, shutdown: &Shutdown) -> Result<(), ServerError> {
        let http = bind(&self.config.listener.http_address).await?;

        let https = match &self.config.tls {
            Some(tls) if self.config.https_enabled() => {
                let tls_config = load_tls_config(tls).await?;
                let listener = bind(&self.config.listener.https_address)
                    .await?
                    .into_std()?;
                Some((listener, tls_config))
            }
            Some(_) => {
                tracing::info!(
                    environment = %self.config.listener.environment,
                    "HTTPS listener disabled in production"
                );
                None
            }
            None => {
                tracing::info!("HTTPS listener disabled, no TLS configured");
                None
            }
        };

        self.serve(http, https, shutdown).await
    }

    /// Serve on already bound listeners.
    pub async fn serve(
        self,
        http: TcpListener,
        https: Option<(std::net::TcpListener, RustlsConfig)>,
        shutdown: &Shutdown,
    ) -> Result<(), ServerError> {
        let environment = self.config.listener.environment.clone();
        let http_task = serve_http(self.router.clone(), http, shutdown.notified(), &environment);

        match https {
            Some((listener, tls)) => {
                let https_task =
                    serve_https(self.router, listener, tls, shutdown.notified(), &environment);
                tokio::try_join!(http_task, https_task)?;
            }
            None => http_task.await?,
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })
}

async fn serve_http(
    router: Router,
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
    environment: &str,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(
        address = %addr,
        port = addr.port(),
        environment = %environment,
        "HTTP server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn serve_https(
    router: Router,
    listener: std::net::TcpListener,
    tls: RustlsConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
    environment: &str,
) -> Result<(), std::io::Error> {
    listener.set_nonblocking(true)?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(
        address = %addr,
        port = addr.port(),
        environment = %environment,
        "HTTPS server listening"
    );

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(Some(TLS_GRACE_PERIOD));
    });

    axum_server::from_tcp_rustls(listener, tls)
        .handle(handle)
        .serve(router.into_make_service())
        .await
}

/// The one connection-handling callback shared by both listeners.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let method = normalize_method(&parts.method);
    let path = normalize_path(parts.uri.path());
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let body = match collect_body(body, state.max_body_size).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Rejected request body");
            let result = match e {
                BodyError::TooLarge { .. } => HandlerResult::payload_too_large(),
                BodyError::Read(_) => HandlerResult::unreadable_body(),
            };
            return emit(&method, &path, result);
        }
    };

    let result = state.dispatcher.dispatch(&parts, &body, &request_id).await;
    emit(&method, &path, result)
}
