//! HTTP request-processing pipeline.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, single fallback handler)
//!     → request.rs (normalize method, path, query, headers)
//!     → body.rs (collect body as UTF-8, enforce size limit)
//!     → dispatcher.rs (decode payload, resolve route, run handler)
//!     → handler.rs (handler contract, single-use responder)
//!     → response.rs (typed result → status, content type, bytes)
//!     → Send to client
//! ```

pub mod body;
pub mod dispatcher;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use handler::{Handler, HandlerError, HandlerFuture, Responder, SharedHandler};
pub use request::{HeaderField, JsonMap, RequestDescriptor};
pub use response::{ContentType, HandlerResult, Payload, ResponseBody};
pub use server::{DispatchServer, ServerError, X_REQUEST_ID};
