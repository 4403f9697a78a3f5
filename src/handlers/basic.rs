//! Liveness and fallback handlers.

use axum::http::StatusCode;

use crate::http::handler::{HandlerError, Responder};
use crate::http::request::RequestDescriptor;

/// Liveness probe: 200 with an empty JSON object.
pub async fn ping(_req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
    respond.status(StatusCode::OK);
    Ok(())
}

/// Fallback for paths with no route: 404 with an empty JSON object.
pub async fn not_found(req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
    tracing::debug!(method = %req.method, path = %req.path, "No route matched");
    respond.status(StatusCode::NOT_FOUND);
    Ok(())
}
