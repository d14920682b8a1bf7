//! VietMap API response types.
//!
//! The v3 search and autocomplete endpoints return a bare JSON array of
//! results; place detail returns a single object. Coordinate fields are
//! optional everywhere — search results usually carry only a `ref_id`,
//! and the longitude field is named `lng` on the wire.

use serde::Deserialize;

/// One result from the text-search endpoint (`/api/search/v3`).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// The place-detail object (`/api/place/v3`), keyed by `ref_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetail {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub display: Option<String>,
}

/// One result from the autocomplete endpoint (`/api/autocomplete/v3`).
/// Unlike search results, these sometimes carry coordinates directly.
#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteItem {
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub display: Option<String>,
}

/// The routing response (`/api/route`). Only the first path is used.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub paths: Vec<RoutePath>,
}

/// One path from the routing response.
///
/// `points` is the encoded polyline when `points_encoded=true` was
/// requested; it is kept as a raw value because the service returns a
/// GeoJSON object instead of a string when encoding is off, and a
/// malformed shape must degrade to "no usable route" rather than a
/// deserialization error.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutePath {
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub points: Option<serde_json::Value>,
}
