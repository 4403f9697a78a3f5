//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Normalized path (e.g. "public/css/app.css")
//!     → router.rs (route lookup)
//!     → matcher.rs (substring rules, checked first)
//!     → exact table
//!     → Return: matched Route or the not-found Route
//!
//! Route Compilation (at startup):
//!     RouteTable::builder(not_found)
//!     → .static_assets(..) / .matching(..) / .route(..)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First matcher wins, then exact match, then not-found

pub mod matcher;
pub mod router;

pub use matcher::{ContainsMatcher, Matcher};
pub use router::{Route, RouteTable, RouteTableBuilder, STATIC_PREFIX};
