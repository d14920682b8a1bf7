//! Result types produced by a match run. All of these are transient:
//! recomputed on every search over a facility snapshot taken at call time,
//! and superseded by the next search.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use ricelink_core::{Facility, GeoPoint};

/// A computed driving route from the customer to one facility.
///
/// `coordinates` is in `(longitude, latitude)` order, ready for GeoJSON.
/// A result with empty coordinates or a non-finite distance never survives
/// into [`MatchOutcome`]; the engine discards it during partitioning.
#[derive(Debug, Clone)]
pub struct RouteResult {
    pub facility: Facility,
    pub distance_m: f64,
    pub coordinates: Vec<(f64, f64)>,
}

impl RouteResult {
    pub(crate) fn is_usable(&self) -> bool {
        !self.coordinates.is_empty() && self.distance_m.is_finite()
    }
}

/// One entry of the ranked candidate list shown to the customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub facility_id: Uuid,
    pub name: String,
    pub distance_m: f64,
    pub rating: f64,
    pub capacity_tons: i64,
    pub drying_price: Decimal,
}

impl RankedCandidate {
    pub(crate) fn from_route(route: &RouteResult) -> Self {
        Self {
            facility_id: route.facility.id,
            name: route.facility.name.clone(),
            distance_m: route.distance_m,
            rating: route.facility.rating,
            capacity_tons: route.facility.capacity_tons,
            drying_price: route.facility.drying_price,
        }
    }
}

/// The full result of one match run.
///
/// `routes` holds every usable route (for drawing all overlays) in
/// facility-id order; `best_route` is the shortest of them (for the
/// emphasized overlay); `ranked` is the capacity-filtered, sorted list.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub origin: GeoPoint,
    pub ranked: Vec<RankedCandidate>,
    pub best_route: RouteResult,
    pub routes: Vec<RouteResult>,
}
