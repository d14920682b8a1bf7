//! HTTP client for the VietMap services used by the matching engine:
//! text search, place detail, autocomplete, and car routing, plus the
//! polyline decoder for the routing service's encoded path geometry.

mod client;
mod error;
mod geocode;
pub mod polyline;
mod route;
pub mod types;

pub use client::VietmapClient;
pub use error::VietmapError;
pub use route::RouteLeg;
