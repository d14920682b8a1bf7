//! The match run: geocode, concurrent route fan-out, partition, rank.

use futures::stream::{self, StreamExt};
use thiserror::Error;

use ricelink_core::Facility;
use ricelink_vietmap::{VietmapClient, VietmapError};

use crate::types::{MatchOutcome, RankedCandidate, RouteResult};

/// Errors surfaced by [`find_matches`].
#[derive(Debug, Error)]
pub enum MatchError {
    /// The address could not be resolved to coordinates by any geocoding
    /// tier. The attempted address is carried for the user-facing message.
    #[error("không tìm thấy địa chỉ: \"{0}\"")]
    AddressNotFound(String),

    /// Every per-facility route request failed or returned no usable path.
    #[error("không tìm được tuyến đường đến cơ sở sấy nào")]
    NoRoutesFound,

    /// The geocoding search call itself failed; without a resolved origin
    /// there is no meaningful partial result.
    #[error(transparent)]
    Vietmap(#[from] VietmapError),
}

/// Finds, ranks, and routes the facilities matching a customer request.
///
/// Route requests are dispatched as one concurrent batch (bounded by
/// `max_concurrent`) and joined together, so total latency tracks the
/// slowest single call. A facility whose route request fails or returns no
/// usable path is logged and excluded; it never aborts the search. Results
/// are re-keyed to facility-id order before ranking so the batch's arrival
/// order cannot leak into the output — repeated calls over an unchanged
/// snapshot and unchanged upstream responses are identical.
///
/// The capacity filter applies only when `requested_capacity` is a positive
/// finite number; zero, negative, or NaN disables it (the "no capacity
/// entered" case). Ranking is ascending distance, descending rating on
/// ties, facility id beyond that.
///
/// # Errors
///
/// - [`MatchError::AddressNotFound`] when geocoding resolves nothing.
/// - [`MatchError::NoRoutesFound`] when no facility has a usable route.
/// - [`MatchError::Vietmap`] when the geocoding search call fails.
pub async fn find_matches(
    client: &VietmapClient,
    address: &str,
    requested_capacity: f64,
    facilities: &[Facility],
    max_concurrent: usize,
) -> Result<MatchOutcome, MatchError> {
    let origin = client
        .geocode(address)
        .await?
        .ok_or_else(|| MatchError::AddressNotFound(address.trim().to_owned()))?;

    let attempted = facilities.len();
    let mut routes: Vec<RouteResult> = stream::iter(facilities.iter().cloned())
        .map(|facility| async move {
            match client.route_between(origin, facility.location).await {
                Ok(leg) => Some(RouteResult {
                    facility,
                    distance_m: leg.distance_m,
                    coordinates: leg.coordinates,
                }),
                Err(error) => {
                    tracing::warn!(
                        %error,
                        facility = %facility.name,
                        "route request failed; excluding facility from this search"
                    );
                    None
                }
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .filter_map(std::future::ready)
        .collect()
        .await;

    routes.retain(RouteResult::is_usable);
    if routes.len() < attempted {
        tracing::warn!(
            usable = routes.len(),
            attempted,
            "some facility routes were unusable"
        );
    }

    // Arrival order is whatever the batch produced; pin it down before any
    // first-wins tie-break below.
    routes.sort_by(|a, b| a.facility.id.cmp(&b.facility.id));

    let Some(first) = routes.first() else {
        return Err(MatchError::NoRoutesFound);
    };
    let mut best = first;
    for route in &routes {
        if route.distance_m < best.distance_m {
            best = route;
        }
    }
    let best_route = best.clone();

    let ranked = rank(&routes, requested_capacity);
    tracing::debug!(
        candidates = ranked.len(),
        routes = routes.len(),
        best = %best_route.facility.name,
        "match run complete"
    );

    Ok(MatchOutcome {
        origin,
        ranked,
        best_route,
        routes,
    })
}

/// Applies the capacity filter and the distance/rating sort.
///
/// Expects `routes` to already be in facility-id order; the sort is stable,
/// so residual ties keep that order.
fn rank(routes: &[RouteResult], requested_capacity: f64) -> Vec<RankedCandidate> {
    let filter_active = requested_capacity.is_finite() && requested_capacity > 0.0;

    #[allow(clippy::cast_precision_loss)]
    let mut ranked: Vec<RankedCandidate> = routes
        .iter()
        .filter(|r| !filter_active || r.facility.capacity_tons as f64 >= requested_capacity)
        .map(RankedCandidate::from_route)
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_m
            .total_cmp(&b.distance_m)
            .then_with(|| b.rating.total_cmp(&a.rating))
    });
    ranked
}
