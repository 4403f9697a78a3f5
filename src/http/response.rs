//! Handler results and response emission.
//!
//! # Responsibilities
//! - Model a handler's result as a typed (status, body) pair
//! - Coerce loose (status?, payload?, content-type?) triples using the
//!   per-content-type defaults
//! - Serialize the result into status, `Content-Type` and body bytes
//!
//! # Design Decisions
//! - The body variant carries its content type, so every tag has exactly
//!   one encoding and the match below is exhaustive
//! - Unknown content-type tags fall back to JSON
//! - Invalid or missing status codes fall back to 200

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde_json::json;

use crate::http::request::JsonMap;

/// Content types a handler may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    #[default]
    Json,
    Html,
    Favicon,
    Css,
    Png,
    Jpg,
    Plain,
}

impl ContentType {
    /// Parse a content-type tag. Unknown or absent tags map to `Json`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("html") => Self::Html,
            Some(t) if t.eq_ignore_ascii_case("favicon") => Self::Favicon,
            Some(t) if t.eq_ignore_ascii_case("css") => Self::Css,
            Some(t) if t.eq_ignore_ascii_case("png") => Self::Png,
            Some(t) if t.eq_ignore_ascii_case("jpg") => Self::Jpg,
            Some(t) if t.eq_ignore_ascii_case("plain") => Self::Plain,
            _ => Self::Json,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Favicon => "favicon",
            Self::Css => "css",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Plain => "plain",
        }
    }

    /// Value written to the `Content-Type` header.
    pub fn header_value(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Html => "text/html",
            Self::Favicon => "image/x-icon",
            Self::Css => "text/css",
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Plain => "text/plain",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// An untyped payload as produced by loosely written handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Object(JsonMap),
    Text(String),
    Binary(Bytes),
}

impl From<JsonMap> for Payload {
    fn from(map: JsonMap) -> Self {
        Self::Object(map)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

/// Response body tagged by its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(JsonMap),
    Html(String),
    Favicon(Bytes),
    Css(Bytes),
    Png(Bytes),
    Jpg(Bytes),
    Plain(Bytes),
}

impl ResponseBody {
    /// Build the body for `content_type`, substituting the empty default
    /// whenever the payload does not have the expected shape.
    pub fn coerce(content_type: ContentType, payload: Option<Payload>) -> Self {
        match content_type {
            ContentType::Json => match payload {
                Some(Payload::Object(map)) => Self::Json(map),
                _ => Self::Json(JsonMap::new()),
            },
            ContentType::Html => match payload {
                Some(Payload::Text(text)) => Self::Html(text),
                _ => Self::Html(String::new()),
            },
            ContentType::Favicon => Self::Favicon(raw_bytes(payload)),
            ContentType::Css => Self::Css(raw_bytes(payload)),
            ContentType::Png => Self::Png(raw_bytes(payload)),
            ContentType::Jpg => Self::Jpg(raw_bytes(payload)),
            ContentType::Plain => Self::Plain(raw_bytes(payload)),
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Json(_) => ContentType::Json,
            Self::Html(_) => ContentType::Html,
            Self::Favicon(_) => ContentType::Favicon,
            Self::Css(_) => ContentType::Css,
            Self::Png(_) => ContentType::Png,
            Self::Jpg(_) => ContentType::Jpg,
            Self::Plain(_) => ContentType::Plain,
        }
    }

    /// Wire bytes of the body.
    pub fn into_bytes(self) -> Bytes {
        match self {
            // A string-keyed map always serializes.
            Self::Json(map) => serde_json::to_vec(&map)
                .map(Bytes::from)
                .unwrap_or_else(|_| Bytes::from_static(b"{}")),
            Self::Html(text) => Bytes::from(text),
            Self::Favicon(bytes)
            | Self::Css(bytes)
            | Self::Png(bytes)
            | Self::Jpg(bytes)
            | Self::Plain(bytes) => bytes,
        }
    }
}

/// Text and binary payloads pass through unchanged; objects become empty.
fn raw_bytes(payload: Option<Payload>) -> Bytes {
    match payload {
        Some(Payload::Text(text)) => Bytes::from(text),
        Some(Payload::Binary(bytes)) => bytes,
        Some(Payload::Object(_)) | None => Bytes::new(),
    }
}

/// The single result a handler produces for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl HandlerResult {
    pub fn new(status: StatusCode, body: ResponseBody) -> Self {
        Self { status, body }
    }

    /// JSON result with the given status.
    pub fn json(status: StatusCode, map: JsonMap) -> Self {
        Self::new(status, ResponseBody::Json(map))
    }

    /// Status-only JSON result with an empty object body.
    pub fn empty(status: StatusCode) -> Self {
        Self::json(status, JsonMap::new())
    }

    /// Build a result from an untyped triple, applying the defaults:
    /// status 200, JSON content type and the empty body of that type.
    pub fn from_parts(
        status: Option<u16>,
        payload: Option<Payload>,
        content_type: Option<&str>,
    ) -> Self {
        let content_type = ContentType::from_tag(content_type);
        Self::new(
            status_or_default(status),
            ResponseBody::coerce(content_type, payload),
        )
    }

    /// Fallback for handlers that failed or never answered.
    pub fn unknown_error() -> Self {
        error_result(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unknown error has occurred",
        )
    }

    pub fn timed_out() -> Self {
        error_result(StatusCode::GATEWAY_TIMEOUT, "The request timed out")
    }

    pub fn payload_too_large() -> Self {
        error_result(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    }

    pub fn unreadable_body() -> Self {
        error_result(StatusCode::BAD_REQUEST, "Failed to read request body")
    }

    pub fn content_type(&self) -> ContentType {
        self.body.content_type()
    }
}

fn error_result(status: StatusCode, message: &str) -> HandlerResult {
    let mut map = JsonMap::new();
    map.insert("error".to_string(), json!(message));
    HandlerResult::json(status, map)
}

/// Status code, or 200 when absent or not a valid HTTP status.
pub fn status_or_default(status: Option<u16>) -> StatusCode {
    status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK)
}

impl IntoResponse for HandlerResult {
    fn into_response(self) -> Response {
        let content_type = self.content_type();
        let mut response = Response::new(Body::from(self.body.into_bytes()));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type.header_value()),
        );
        response
    }
}

/// Serialize a handler result into the HTTP response for `method` `path`.
pub fn emit(method: &str, path: &str, result: HandlerResult) -> Response {
    let status = result.status;
    let response = result.into_response();

    tracing::info!(
        method = %method.to_uppercase(),
        path = %path,
        status = status.as_u16(),
        "Response sent"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const ALL: [ContentType; 7] = [
        ContentType::Json,
        ContentType::Html,
        ContentType::Favicon,
        ContentType::Css,
        ContentType::Png,
        ContentType::Jpg,
        ContentType::Plain,
    ];

    fn object(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn unknown_tags_default_to_json() {
        assert_eq!(ContentType::from_tag(None), ContentType::Json);
        assert_eq!(ContentType::from_tag(Some("xml")), ContentType::Json);
        assert_eq!(ContentType::from_tag(Some("PNG")), ContentType::Png);
        for ct in ALL {
            assert_eq!(ContentType::from_tag(Some(ct.tag())), ct);
        }
    }

    #[test]
    fn header_values() {
        let headers: Vec<_> = ALL.iter().map(|ct| ct.header_value()).collect();
        assert_eq!(
            headers,
            [
                "application/json",
                "text/html",
                "image/x-icon",
                "text/css",
                "image/png",
                "image/jpeg",
                "text/plain"
            ]
        );
    }

    #[test]
    fn mismatched_payload_gets_empty_default() {
        for ct in ALL {
            let body = ResponseBody::coerce(ct, None);
            assert_eq!(body.content_type(), ct);
            let expected: &[u8] = if ct == ContentType::Json { b"{}" } else { b"" };
            assert_eq!(body.into_bytes().as_ref(), expected, "{ct}");
        }

        let text_for_json = ResponseBody::coerce(ContentType::Json, Some("hello".into()));
        assert_eq!(text_for_json, ResponseBody::Json(JsonMap::new()));

        let map_for_css = ResponseBody::coerce(ContentType::Css, Some(JsonMap::new().into()));
        assert_eq!(map_for_css, ResponseBody::Css(Bytes::new()));

        let bytes_for_html = ResponseBody::coerce(ContentType::Html, Some(vec![1u8, 2].into()));
        assert_eq!(bytes_for_html, ResponseBody::Html(String::new()));
    }

    #[test]
    fn matching_payload_passes_through() {
        let body = ResponseBody::coerce(ContentType::Plain, Some("pong".into()));
        assert_eq!(body.into_bytes(), Bytes::from_static(b"pong"));

        let body = ResponseBody::coerce(ContentType::Png, Some(vec![0x89u8, b'P'].into()));
        assert_eq!(body.into_bytes().as_ref(), &[0x89, b'P']);

        let body = ResponseBody::coerce(
            ContentType::Json,
            Some(object(json!({"a": 1})).into()),
        );
        assert_eq!(body.into_bytes().as_ref(), br#"{"a":1}"#);
    }

    #[test]
    fn status_defaults() {
        assert_eq!(status_or_default(None), StatusCode::OK);
        assert_eq!(status_or_default(Some(42)), StatusCode::OK);
        assert_eq!(status_or_default(Some(201)), StatusCode::CREATED);
    }

    #[test]
    fn from_parts_applies_all_defaults() {
        let result = HandlerResult::from_parts(None, None, None);
        assert_eq!(result, HandlerResult::empty(StatusCode::OK));
    }

    #[tokio::test]
    async fn emit_writes_header_status_and_body() {
        let response = emit("get", "ping", HandlerResult::unknown_error());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), br#"{"error":"An unknown error has occurred"}"#);
    }
}
