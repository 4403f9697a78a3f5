//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → tower-http TraceLayer (request/response spans)
//!     → x-request-id (set on entry, echoed on exit, logged by the dispatcher)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows from the router into handler diagnostics

pub mod logging;

pub use logging::init_logging;
