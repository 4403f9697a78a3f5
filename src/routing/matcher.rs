//! Path matchers evaluated before exact route lookup.
//!
//! # Responsibilities
//! - Match normalized paths against a fixed substring
//!
//! # Design Decisions
//! - Matching is case-sensitive
//! - Paths are already normalized (no leading/trailing slashes)
//! - No regex to guarantee O(n) matching

/// Trait for matching normalized request paths.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches paths containing a substring anywhere.
#[derive(Debug, Clone)]
pub struct ContainsMatcher {
    needle: String,
}

impl ContainsMatcher {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl Matcher for ContainsMatcher {
    fn matches(&self, path: &str) -> bool {
        path.contains(self.needle.as_str())
    }
}
