//! Driving-route fetching on top of the raw routing endpoint.

use ricelink_core::GeoPoint;

use crate::client::VietmapClient;
use crate::error::VietmapError;
use crate::polyline;

/// A driving route between two points.
///
/// `coordinates` is empty exactly when the routing call returned no usable
/// path, in which case `distance_m` is `f64::INFINITY` or whatever partial
/// distance the response carried; callers must treat empty coordinates as
/// "no usable route" and exclude the leg from ranking.
#[derive(Debug, Clone)]
pub struct RouteLeg {
    pub distance_m: f64,
    /// Decoded path geometry in `(longitude, latitude)` order.
    pub coordinates: Vec<(f64, f64)>,
}

impl RouteLeg {
    /// Whether this leg can participate in ranking.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.coordinates.is_empty() && self.distance_m.is_finite()
    }
}

impl VietmapClient {
    /// Fetches the car route from `origin` to `destination` and decodes its
    /// path geometry.
    ///
    /// A response without a path, or with a `points` field that is not an
    /// encoded polyline string, yields a [`RouteLeg`] with empty
    /// coordinates rather than an error — one bad facility route must not
    /// abort a multi-facility search.
    ///
    /// # Errors
    ///
    /// Returns [`VietmapError`] when the HTTP call itself fails; callers
    /// issuing batched per-facility requests catch this per request.
    pub async fn route_between(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteLeg, VietmapError> {
        let response = self.fetch_route(origin, destination).await?;

        let Some(path) = response.paths.into_iter().next() else {
            tracing::warn!(%origin, %destination, "route response contained no paths");
            return Ok(RouteLeg {
                distance_m: f64::INFINITY,
                coordinates: Vec::new(),
            });
        };

        let distance_m = path.distance.unwrap_or(f64::INFINITY);
        let Some(encoded) = path.points.as_ref().and_then(serde_json::Value::as_str) else {
            tracing::warn!(%origin, %destination, "unexpected route points shape");
            return Ok(RouteLeg {
                distance_m,
                coordinates: Vec::new(),
            });
        };

        Ok(RouteLeg {
            distance_m,
            coordinates: polyline::decode(encoded),
        })
    }
}
