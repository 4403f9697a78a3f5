//! Handler invocation contract.
//!
//! A handler receives the [`RequestDescriptor`] and a single-use
//! [`Responder`]. It answers by consuming the responder; returning an
//! error, panicking, or dropping the responder unanswered is contained by
//! the dispatcher and turned into the generic 500 response.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::StatusCode;
use tokio::sync::oneshot;

use crate::http::request::{JsonMap, RequestDescriptor};
use crate::http::response::{HandlerResult, Payload};

/// Error a handler may return instead of responding.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by [`Handler::call`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>>;

/// A unit of request-handling logic bound to a route.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: RequestDescriptor, respond: Responder) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestDescriptor, Responder) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn call(&self, request: RequestDescriptor, respond: Responder) -> HandlerFuture {
        Box::pin(self(request, respond))
    }
}

/// Handler shared between the route table and in-flight requests.
pub type SharedHandler = Arc<dyn Handler>;

/// Single-use response callback.
///
/// Every method consumes the responder, so a handler can answer at most
/// once. Dropping it without answering produces the 500 fallback.
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<HandlerResult>,
}

impl Responder {
    /// Create a responder and the receiving end the dispatcher waits on.
    pub fn channel() -> (Self, oneshot::Receiver<HandlerResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Send the typed result.
    pub fn respond(self, result: HandlerResult) {
        if self.tx.send(result).is_err() {
            // The dispatcher stopped waiting (timeout); nothing to deliver to.
            tracing::debug!("Response discarded, dispatcher no longer waiting");
        }
    }

    /// Respond with a JSON object.
    pub fn json(self, status: StatusCode, map: JsonMap) {
        self.respond(HandlerResult::json(status, map));
    }

    /// Respond with a status and an empty JSON object.
    pub fn status(self, status: StatusCode) {
        self.respond(HandlerResult::empty(status));
    }

    /// Respond with an untyped triple; see [`HandlerResult::from_parts`].
    pub fn respond_with(
        self,
        status: Option<u16>,
        payload: Option<Payload>,
        content_type: Option<&str>,
    ) {
        self.respond(HandlerResult::from_parts(status, payload, content_type));
    }
}
