//! Route lookup.
//!
//! # Responsibilities
//! - Store routes compiled at startup
//! - Resolve a normalized path to exactly one route
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Matchers are checked in insertion order before the exact table
//! - O(1) exact lookup via HashMap
//! - Explicit not-found route rather than an `Option`

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::handler::{Handler, SharedHandler};
use crate::http::request::normalize_path;
use crate::routing::matcher::{ContainsMatcher, Matcher};

/// Path fragment that routes a request to the static asset handler.
pub const STATIC_PREFIX: &str = "public/";

/// A named handler.
#[derive(Clone)]
pub struct Route {
    name: String,
    handler: SharedHandler,
}

impl Route {
    fn new(name: impl Into<String>, handler: SharedHandler) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    /// Route identifier for logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> SharedHandler {
        Arc::clone(&self.handler)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route").field("name", &self.name).finish()
    }
}

/// Immutable route table.
#[derive(Debug)]
pub struct RouteTable {
    matchers: Vec<(Box<dyn Matcher>, Route)>,
    exact: HashMap<String, Route>,
    not_found: Route,
}

impl RouteTable {
    /// Start a table whose unmatched paths go to `not_found`.
    pub fn builder(not_found: impl Handler) -> RouteTableBuilder {
        RouteTableBuilder {
            matchers: Vec::new(),
            exact: HashMap::new(),
            not_found: Route::new("not_found", Arc::new(not_found)),
        }
    }

    /// Resolve a normalized path.
    ///
    /// Matchers take priority over exact keys; anything else falls through
    /// to the not-found route.
    pub fn resolve(&self, path: &str) -> &Route {
        if let Some((_, route)) = self.matchers.iter().find(|(m, _)| m.matches(path)) {
            return route;
        }
        self.exact.get(path).unwrap_or(&self.not_found)
    }

    /// Number of exact routes.
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

/// Collects routes before freezing them into a [`RouteTable`].
pub struct RouteTableBuilder {
    matchers: Vec<(Box<dyn Matcher>, Route)>,
    exact: HashMap<String, Route>,
    not_found: Route,
}

impl RouteTableBuilder {
    /// Bind an exact path. The key is normalized like request paths are.
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        let key = normalize_path(path);
        let route = Route::new(key.clone(), Arc::new(handler));
        if self.exact.insert(key.clone(), route).is_some() {
            tracing::warn!(path = %key, "Route registered twice, keeping the last handler");
        }
        self
    }

    /// Bind every path accepted by `matcher`, ahead of exact routes.
    pub fn matching(
        mut self,
        name: impl Into<String>,
        matcher: impl Matcher + 'static,
        handler: impl Handler,
    ) -> Self {
        self.matchers
            .push((Box::new(matcher), Route::new(name, Arc::new(handler))));
        self
    }

    /// Bind the static asset handler to every path containing `public/`.
    pub fn static_assets(self, handler: impl Handler) -> Self {
        self.matching("public", ContainsMatcher::new(STATIC_PREFIX), handler)
    }

    pub fn build(self) -> RouteTable {
        tracing::debug!(
            exact_routes = self.exact.len(),
            matchers = self.matchers.len(),
            "Route table built"
        );
        RouteTable {
            matchers: self.matchers,
            exact: self.exact,
            not_found: self.not_found,
        }
    }
}
