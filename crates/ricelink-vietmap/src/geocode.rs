//! Address geocoding with a two-tier coordinate fallback.
//!
//! Search results rarely carry coordinates directly, so resolution runs:
//! text search → place detail by `ref_id` → autocomplete. Each tier's
//! failure is logged and falls through to the next; only a failure of the
//! search call itself is an error, because without a result list there is
//! nothing to fall back on.

use ricelink_core::GeoPoint;

use crate::client::VietmapClient;
use crate::error::VietmapError;

impl VietmapClient {
    /// Resolves a free-text address to a geographic point.
    ///
    /// Returns `Ok(None)` when the address is blank (no network call is
    /// made), when the search returns no results, or when neither the
    /// place-detail nor the autocomplete tier yields coordinates — all of
    /// which mean "address unresolvable", as distinct from a service error.
    ///
    /// # Errors
    ///
    /// Returns [`VietmapError`] only when the search call itself fails.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, VietmapError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let results = self.search(address).await?;
        let Some(first) = results.into_iter().next() else {
            tracing::debug!(address, "search returned no results");
            return Ok(None);
        };

        // Tier 1: place detail by reference id.
        if let Some(ref_id) = first.ref_id.as_deref() {
            match self.place_detail(ref_id).await {
                Ok(detail) => {
                    if let (Some(lat), Some(lng)) = (detail.lat, detail.lng) {
                        return Ok(Some(GeoPoint::new(lat, lng)));
                    }
                    tracing::warn!(ref_id, "place detail carried no coordinates");
                }
                Err(error) => {
                    tracing::warn!(%error, ref_id, "place detail tier failed, trying autocomplete");
                }
            }
        }

        // Tier 2: autocomplete with the original text.
        match self.autocomplete(address).await {
            Ok(items) => {
                if let Some(item) = items.into_iter().next() {
                    if let (Some(lat), Some(lng)) = (item.lat, item.lng) {
                        return Ok(Some(GeoPoint::new(lat, lng)));
                    }
                }
                tracing::warn!(address, "autocomplete carried no coordinates");
            }
            Err(error) => {
                tracing::warn!(%error, address, "autocomplete tier failed");
            }
        }

        tracing::warn!(address, "no coordinates from any tier");
        Ok(None)
    }
}
