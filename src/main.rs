//! HTTP/HTTPS Request Dispatcher
//!
//! Accepts connections on a plain and a TLS listener, normalizes each
//! request, resolves a handler from a static route table and serializes
//! the handler's result.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────────┐
//!                  │                   REQUEST DISPATCHER                     │
//!                  │                                                          │
//!  HTTP  :3000 ────┼─▶┌──────────┐   ┌──────────┐   ┌──────────┐             │
//!                  │  │  server  │──▶│ request  │──▶│   body   │             │
//!  HTTPS :3001 ────┼─▶│ (axum)   │   │normalize │   │ collect  │             │
//!                  │  └──────────┘   └──────────┘   └────┬─────┘             │
//!                  │                                     ▼                    │
//!                  │  ┌──────────┐   ┌──────────┐   ┌──────────┐             │
//!  Response ◀──────┼──│ response │◀──│ handler  │◀──│dispatcher│◀── routing  │
//!                  │  │  emit    │   │  task    │   │ contain  │    table    │
//!                  │  └──────────┘   └──────────┘   └──────────┘             │
//!                  └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use request_dispatcher::config::resolve_config;
use request_dispatcher::handlers::default_routes;
use request_dispatcher::lifecycle::{trigger_on_signal, Shutdown};
use request_dispatcher::observability::init_logging;
use request_dispatcher::DispatchServer;

#[derive(Parser)]
#[command(name = "request-dispatcher")]
#[command(about = "Minimal HTTP/HTTPS request dispatcher", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment name; "production" disables the HTTPS listener.
    #[arg(short, long, env = "DISPATCHER_ENV")]
    environment: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match resolve_config(cli.config.as_deref(), cli.environment.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.listener.environment,
        http_address = %config.listener.http_address,
        https_enabled = config.https_enabled(),
        max_body_size = config.limits.max_body_size,
        handler_timeout_ms = config.limits.handler_timeout_ms,
        "Configuration loaded"
    );

    let routes = default_routes(&config.static_files).build();
    let server = DispatchServer::new(config, routes);

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        trigger_on_signal(&signal_shutdown).await;
    });

    if let Err(e) = server.run(&shutdown).await {
        tracing::error!(error = %e, "Server failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
