//! The facility matching and ranking engine.
//!
//! Given a customer address and a requested drying capacity, the engine
//! geocodes the address, fetches driving routes to every candidate facility
//! concurrently, filters by capacity, ranks by distance (rating breaks
//! ties), and hands the result to the map view-model builder for rendering.

mod engine;
pub mod types;
pub mod view;

pub use engine::{find_matches, MatchError};
pub use types::{MatchOutcome, RankedCandidate, RouteResult};
pub use view::{build_map_view, Bounds, MapView};
