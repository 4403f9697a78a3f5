//! Static asset serving.
//!
//! Serves files below the configured static root for every path that
//! contains `public/`, plus the favicon.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::http::StatusCode;

use crate::http::handler::{Handler, HandlerError, HandlerFuture, Responder};
use crate::http::request::RequestDescriptor;
use crate::http::response::{ContentType, HandlerResult, Payload, ResponseBody};
use crate::routing::STATIC_PREFIX;

const FAVICON_FILE: &str = "favicon.ico";

/// Content type for a file, derived from its extension.
pub fn content_type_for(path: &Path) -> ContentType {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("css") => ContentType::Css,
        Some("png") => ContentType::Png,
        Some("jpg" | "jpeg") => ContentType::Jpg,
        Some("ico") => ContentType::Favicon,
        Some("html" | "htm") => ContentType::Html,
        _ => ContentType::Plain,
    }
}

/// Relative asset path for a request path, or `None` if it would escape the root.
///
/// Everything up to and including the first `public/` is dropped.
pub fn asset_path(request_path: &str) -> Option<PathBuf> {
    let (_, relative) = request_path.split_once(STATIC_PREFIX)?;
    let relative = Path::new(relative);

    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !safe || relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_path_buf())
}

/// Handler for `public/...` paths.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn serve(self, req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
        if req.method != "get" {
            respond.status(StatusCode::METHOD_NOT_ALLOWED);
            return Ok(());
        }

        let Some(relative) = asset_path(&req.path) else {
            tracing::warn!(path = %req.path, "Rejected static asset path");
            respond.status(StatusCode::NOT_FOUND);
            return Ok(());
        };

        serve_file(&self.root.join(relative), respond).await
    }
}

impl Handler for StaticAssets {
    fn call(&self, request: RequestDescriptor, respond: Responder) -> HandlerFuture {
        Box::pin(self.clone().serve(request, respond))
    }
}

/// Handler for `favicon.ico`.
#[derive(Debug, Clone)]
pub struct Favicon {
    path: PathBuf,
}

impl Favicon {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(FAVICON_FILE),
        }
    }
}

impl Handler for Favicon {
    fn call(&self, request: RequestDescriptor, respond: Responder) -> HandlerFuture {
        let path = self.path.clone();
        Box::pin(async move {
            if request.method != "get" {
                respond.status(StatusCode::METHOD_NOT_ALLOWED);
                return Ok(());
            }
            serve_file(&path, respond).await
        })
    }
}

/// Read `path` and respond with its contents. Missing files are a 404;
/// other I/O errors are returned to the dispatcher.
async fn serve_file(path: &Path, respond: Responder) -> Result<(), HandlerError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            respond.status(StatusCode::NOT_FOUND);
            return Ok(());
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            respond.status(StatusCode::NOT_FOUND);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }
    let data = tokio::fs::read(path).await?;

    let content_type = content_type_for(path);
    let payload = match content_type {
        ContentType::Html => Payload::Text(String::from_utf8_lossy(&data).into_owned()),
        _ => Payload::from(data),
    };

    respond.respond(HandlerResult::new(
        StatusCode::OK,
        ResponseBody::coerce(content_type, Some(payload)),
    ));
    Ok(())
}
