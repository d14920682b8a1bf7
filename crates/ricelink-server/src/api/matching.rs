//! The search endpoint: snapshot the facilities, run the matching engine,
//! and return the ranked list plus the map view model.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ricelink_matching::{build_map_view, find_matches, MapView, MatchError, RankedCandidate};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    pub address: String,
    /// Tons/day the customer needs dried. Zero or absent disables the
    /// capacity filter.
    #[serde(default)]
    pub requested_capacity: Option<f64>,
    /// Opaque client token echoed back in the view model, so the UI can
    /// drop responses from searches it has already superseded.
    #[serde(default)]
    pub generation: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub ranked: Vec<RankedCandidate>,
    pub best_facility_id: Uuid,
    pub map: MapView,
}

/// POST /api/v1/matching/search
pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let rid = req_id.0;

    if body.address.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "Vui lòng nhập địa chỉ.",
        ));
    }

    let Some(vietmap) = state.vietmap.as_deref() else {
        return Err(ApiError::new(
            rid,
            "not_configured",
            "Dịch vụ bản đồ chưa được cấu hình.",
        ));
    };

    let facilities: Vec<_> = ricelink_db::list_facilities(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .into_iter()
        .map(ricelink_db::FacilityRow::into_facility)
        .collect();

    let outcome = find_matches(
        vietmap,
        &body.address,
        body.requested_capacity.unwrap_or(0.0),
        &facilities,
        state.config.route_max_concurrent,
    )
    .await
    .map_err(|error| match error {
        MatchError::AddressNotFound(address) => ApiError::new(
            rid.clone(),
            "address_not_found",
            format!(
                "Không tìm thấy địa chỉ: \"{address}\". \
                 Hãy thử nhập địa chỉ chi tiết hơn hoặc tên huyện/thành phố."
            ),
        ),
        MatchError::NoRoutesFound => ApiError::new(
            rid.clone(),
            "no_routes_found",
            "Không tìm được tuyến đường đến cơ sở sấy nào. Vui lòng thử lại.",
        ),
        MatchError::Vietmap(error) => {
            tracing::error!(%error, "vietmap search call failed");
            ApiError::new(
                rid.clone(),
                "upstream_error",
                "Dịch vụ bản đồ đang gặp sự cố. Vui lòng thử lại sau.",
            )
        }
    })?;

    let map = build_map_view(&outcome, &facilities, body.generation.unwrap_or(0));

    Ok(Json(ApiResponse {
        data: SearchResponse {
            best_facility_id: outcome.best_route.facility.id,
            ranked: outcome.ranked,
            map,
        },
        meta: ResponseMeta::new(rid),
    }))
}
