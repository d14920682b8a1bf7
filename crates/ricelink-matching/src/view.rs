//! Render-ready view model for the interactive map.
//!
//! The map frontend draws three things from one search: a marker per
//! facility (with a name/address popup), the customer's location marker,
//! and the route overlays — every usable route on a thin base layer, the
//! shortest redrawn on an emphasis layer selected by the `is_shortest`
//! property. The view model is complete per search: the client replaces
//! its previous sources and layers wholesale and refits the viewport to
//! `bounds`, so overlays never accumulate across searches. The `generation`
//! token is echoed from the request so an overlapping earlier search's
//! response can be recognized as stale and dropped.

use serde::Serialize;
use uuid::Uuid;

use ricelink_core::Facility;

use crate::types::MatchOutcome;

/// A GeoJSON `FeatureCollection` of route lines.
#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<RouteFeature>,
}

/// A GeoJSON `LineString` feature for one route.
#[derive(Debug, Serialize)]
pub struct RouteFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: LineGeometry,
    pub properties: RouteProperties,
}

#[derive(Debug, Serialize)]
pub struct LineGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `[longitude, latitude]` pairs.
    pub coordinates: Vec<(f64, f64)>,
}

#[derive(Debug, Serialize)]
pub struct RouteProperties {
    pub facility_id: Uuid,
    pub name: String,
    pub distance_m: f64,
    pub is_shortest: bool,
}

/// A marker: one per facility, plus the customer's location.
#[derive(Debug, Serialize)]
pub struct Marker {
    /// `[longitude, latitude]`.
    pub position: (f64, f64),
    pub name: String,
    pub address: Option<String>,
}

/// Bounding box enclosing all drawn routes, for the viewport refit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    fn extend(&mut self, (lon, lat): (f64, f64)) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }
}

/// Everything the map needs to redraw after one search.
#[derive(Debug, Serialize)]
pub struct MapView {
    pub generation: u64,
    pub user_location: Marker,
    pub facility_markers: Vec<Marker>,
    pub routes: FeatureCollection,
    pub bounds: Option<Bounds>,
}

/// Builds the map view model from a match outcome.
///
/// Every usable route becomes a `LineString` feature; the best route's
/// feature carries `is_shortest: true` so the emphasis layer can filter on
/// it. Bounds cover every coordinate of every drawn route.
#[must_use]
pub fn build_map_view(outcome: &MatchOutcome, facilities: &[Facility], generation: u64) -> MapView {
    let features: Vec<RouteFeature> = outcome
        .routes
        .iter()
        .map(|route| RouteFeature {
            kind: "Feature",
            geometry: LineGeometry {
                kind: "LineString",
                coordinates: route.coordinates.clone(),
            },
            properties: RouteProperties {
                facility_id: route.facility.id,
                name: route.facility.name.clone(),
                distance_m: route.distance_m,
                is_shortest: route.facility.id == outcome.best_route.facility.id,
            },
        })
        .collect();

    let mut bounds: Option<Bounds> = None;
    for route in &outcome.routes {
        for &point in &route.coordinates {
            match bounds.as_mut() {
                Some(b) => b.extend(point),
                None => {
                    bounds = Some(Bounds {
                        min_lon: point.0,
                        min_lat: point.1,
                        max_lon: point.0,
                        max_lat: point.1,
                    });
                }
            }
        }
    }

    MapView {
        generation,
        user_location: Marker {
            position: (outcome.origin.lon, outcome.origin.lat),
            name: "Vị trí của bạn".to_owned(),
            address: None,
        },
        facility_markers: facilities
            .iter()
            .map(|f| Marker {
                position: (f.location.lon, f.location.lat),
                name: f.name.clone(),
                address: Some(f.address.clone()),
            })
            .collect(),
        routes: FeatureCollection {
            kind: "FeatureCollection",
            features,
        },
        bounds,
    }
}
