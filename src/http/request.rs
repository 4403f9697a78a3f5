//! Request normalization.
//!
//! # Responsibilities
//! - Strip leading/trailing slashes from the path
//! - Lower-case the method
//! - Parse the query string into flat key/value pairs
//! - Collect headers, grouping repeated names
//! - Best-effort JSON decoding of the collected body
//!
//! # Design Decisions
//! - Internal slashes are kept: `api/users` is one route key, not two segments
//! - Unknown methods pass through; handlers decide what to reject
//! - Decoding never fails, it degrades to an empty object

use std::collections::HashMap;

use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Uri};
use serde::Serialize;
use serde_json::Value;

/// JSON object type used for request payloads and JSON responses.
pub type JsonMap = serde_json::Map<String, Value>;

/// A header value, or all values when the header was sent more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderField {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderField {
    /// First value of the header.
    pub fn first(&self) -> &str {
        match self {
            Self::Single(value) => value,
            Self::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(values) => values.push(value),
        }
    }
}

/// The normalized request handed to exactly one handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub path: String,
    pub method: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, HeaderField>,
    pub payload: JsonMap,
}

impl RequestDescriptor {
    /// Assemble a descriptor from raw request parts and the body text.
    pub fn new(method: &Method, uri: &Uri, headers: &HeaderMap, body: &str) -> Self {
        Self {
            path: normalize_path(uri.path()),
            method: normalize_method(method),
            query: parse_query(uri.query()),
            headers: collect_headers(headers),
            payload: decode_payload(body),
        }
    }

    pub fn from_parts(parts: &Parts, body: &str) -> Self {
        Self::new(&parts.method, &parts.uri, &parts.headers, body)
    }

    /// Case-insensitive header lookup returning the first value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(HeaderField::first)
    }
}

/// Strip every leading and trailing `/`.
pub fn normalize_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}

pub fn normalize_method(method: &Method) -> String {
    method.as_str().to_lowercase()
}

/// Parse a query string into percent-decoded pairs. Last value wins.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Collect headers by lower-case name, decoding values lossily as UTF-8.
pub fn collect_headers(headers: &HeaderMap) -> HashMap<String, HeaderField> {
    let mut collected: HashMap<String, HeaderField> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match collected.get_mut(name.as_str()) {
            Some(field) => field.push(value),
            None => {
                collected.insert(name.as_str().to_string(), HeaderField::Single(value));
            }
        }
    }
    collected
}

/// Decode `text` as a JSON object.
///
/// Empty text, malformed JSON and non-object documents all yield an empty map.
pub fn decode_payload(text: &str) -> JsonMap {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        _ => JsonMap::new(),
    }
}
