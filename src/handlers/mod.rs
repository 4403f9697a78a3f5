//! Built-in handlers and the default route table.
//!
//! Application handlers are registered the same way: any
//! `async fn(RequestDescriptor, Responder) -> Result<(), HandlerError>`
//! or type implementing [`Handler`](crate::http::Handler).

pub mod basic;
pub mod static_files;

use crate::config::schema::StaticFilesConfig;
use crate::routing::{RouteTable, RouteTableBuilder};

pub use basic::{not_found, ping};
pub use static_files::{Favicon, StaticAssets};

/// Route table builder preloaded with the infrastructure routes.
pub fn default_routes(config: &StaticFilesConfig) -> RouteTableBuilder {
    RouteTable::builder(not_found)
        .static_assets(StaticAssets::new(&config.root))
        .route("ping", ping)
        .route("favicon.ico", Favicon::new(&config.root))
}
