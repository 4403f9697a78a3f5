//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → tls.rs (read PEM blobs, validate, build rustls acceptor config)
//!     → http::server (plain listener + TLS listener, same router)
//! ```
//!
//! # Design Decisions
//! - Certificate and key are opaque PEM blobs until rustls parses them
//! - TLS is optional and disabled in production, where it terminates upstream

pub mod tls;

pub use tls::{load_tls_config, TlsError, TlsMaterial};
