//! HTTP client for the VietMap REST endpoints.
//!
//! Wraps `reqwest` with API-key management, per-request timeouts, and typed
//! response deserialization. The higher-level geocoding fallback chain and
//! route fetching live in the `geocode` and `route` modules; this module
//! exposes one method per endpoint.

use std::time::Duration;

use reqwest::{Client, Url};

use ricelink_core::GeoPoint;

use crate::error::VietmapError;
use crate::types::{AutocompleteItem, PlaceDetail, RouteResponse, SearchItem};

const DEFAULT_BASE_URL: &str = "https://maps.vietmap.vn/";

/// Client for the VietMap REST API.
///
/// Manages the HTTP client, API key, and base URL. Use [`VietmapClient::new`]
/// for production or [`VietmapClient::with_base_url`] to point at a mock
/// server in tests.
pub struct VietmapClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl VietmapClient {
    /// Creates a new client pointed at the production VietMap API.
    ///
    /// # Errors
    ///
    /// Returns [`VietmapError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, VietmapError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`VietmapError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VietmapError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, VietmapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ricelink/0.1 (facility-matching)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // Url::join appends endpoint paths instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| VietmapError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Free-text search (`/api/search/v3`). An empty result array is the
    /// normal "no match" outcome, not an error.
    ///
    /// # Errors
    ///
    /// - [`VietmapError::Http`] on network failure or non-2xx HTTP status.
    /// - [`VietmapError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search(&self, text: &str) -> Result<Vec<SearchItem>, VietmapError> {
        let url = self.build_url("api/search/v3", &[("text", text)])?;
        self.request_json(&url).await
    }

    /// Place detail by reference id (`/api/place/v3`).
    ///
    /// # Errors
    ///
    /// - [`VietmapError::Http`] on network failure or non-2xx HTTP status.
    /// - [`VietmapError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn place_detail(&self, ref_id: &str) -> Result<PlaceDetail, VietmapError> {
        let url = self.build_url("api/place/v3", &[("refid", ref_id)])?;
        self.request_json(&url).await
    }

    /// Autocomplete lookup (`/api/autocomplete/v3`). Results may carry
    /// coordinates directly, unlike search results.
    ///
    /// # Errors
    ///
    /// - [`VietmapError::Http`] on network failure or non-2xx HTTP status.
    /// - [`VietmapError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn autocomplete(&self, text: &str) -> Result<Vec<AutocompleteItem>, VietmapError> {
        let url = self.build_url("api/autocomplete/v3", &[("text", text)])?;
        self.request_json(&url).await
    }

    /// Raw car-profile routing request (`/api/route`) with an encoded
    /// polyline in the response. Most callers want
    /// [`VietmapClient::route_between`] instead, which decodes the path and
    /// applies the no-usable-route sentinel.
    ///
    /// # Errors
    ///
    /// - [`VietmapError::Http`] on network failure or non-2xx HTTP status.
    /// - [`VietmapError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn fetch_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RouteResponse, VietmapError> {
        let url = self.build_url(
            "api/route",
            &[
                ("api-version", "1.1"),
                ("point", &origin.to_string()),
                ("point", &destination.to_string()),
                ("vehicle", "car"),
                ("points_encoded", "true"),
            ],
        )?;
        self.request_json(&url).await
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters. The `apikey` parameter is always appended first;
    /// duplicate keys in `extra` (the two routing `point`s) are preserved.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, VietmapError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| VietmapError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apikey", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the
    /// response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VietmapError::Http`] on network failure or a non-2xx status.
    /// Returns [`VietmapError::Deserialize`] if the body does not parse.
    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<T, VietmapError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| VietmapError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> VietmapClient {
        VietmapClient::with_base_url("test-key", 10, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_api_key_and_params() {
        let client = test_client("https://maps.vietmap.vn");
        let url = client
            .build_url("api/search/v3", &[("text", "Cao Lãnh")])
            .expect("url should build");
        assert!(url.as_str().starts_with(
            "https://maps.vietmap.vn/api/search/v3?apikey=test-key&text="
        ));
    }

    #[test]
    fn build_url_keeps_duplicate_point_params() {
        let client = test_client("https://maps.vietmap.vn/");
        let url = client
            .build_url(
                "api/route",
                &[("point", "10.1,105.2"), ("point", "10.3,105.4")],
            )
            .expect("url should build");
        let points: Vec<_> = url
            .query_pairs()
            .filter(|(k, _)| k == "point")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(points, vec!["10.1,105.2", "10.3,105.4"]);
    }

    #[test]
    fn with_base_url_rejects_garbage() {
        let result = VietmapClient::with_base_url("k", 10, "not a url");
        assert!(matches!(
            result,
            Err(VietmapError::InvalidBaseUrl { .. })
        ));
    }
}
