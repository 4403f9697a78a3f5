//! Minimal HTTP/HTTPS request dispatcher library.

pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::DispatcherConfig;
pub use http::{DispatchServer, Handler, HandlerError, HandlerResult, RequestDescriptor, Responder};
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
