//! Facility listing handlers: public read side, admin write side.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct FacilityItem {
    pub id: Uuid,
    pub name: String,
    pub district: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub capacity_tons: i64,
    pub drying_price: Decimal,
    pub drying_and_storage_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ricelink_db::FacilityRow> for FacilityItem {
    fn from(row: ricelink_db::FacilityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            district: row.district,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            rating: row.rating,
            capacity_tons: row.capacity_tons,
            drying_price: row.drying_price,
            drying_and_storage_price: row.drying_and_storage_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FacilityRequest {
    pub name: String,
    pub district: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub capacity_tons: Option<i64>,
    #[serde(default)]
    pub drying_price: Option<Decimal>,
    #[serde(default)]
    pub drying_and_storage_price: Option<Decimal>,
}

/// Validates a facility payload at the repository boundary and converts it
/// into the insert record.
fn validate_facility(req_id: &str, body: &FacilityRequest) -> Result<ricelink_db::NewFacility, ApiError> {
    let name = body.name.trim().to_owned();
    if name.is_empty() || name.len() > 200 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "name must be 1–200 characters",
        ));
    }
    if !(-90.0..=90.0).contains(&body.latitude) || !(-180.0..=180.0).contains(&body.longitude) {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "coordinates out of range",
        ));
    }
    let rating = body.rating.unwrap_or(0.0);
    if !(0.0..=5.0).contains(&rating) {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "rating must be between 0 and 5",
        ));
    }
    let capacity_tons = body.capacity_tons.unwrap_or(0);
    if capacity_tons < 0 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "capacity_tons must not be negative",
        ));
    }
    let drying_price = body.drying_price.unwrap_or(Decimal::ZERO);
    let drying_and_storage_price = body.drying_and_storage_price.unwrap_or(Decimal::ZERO);
    if drying_price < Decimal::ZERO || drying_and_storage_price < Decimal::ZERO {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "prices must not be negative",
        ));
    }

    Ok(ricelink_db::NewFacility {
        name,
        district: body.district.trim().to_owned(),
        address: body.address.trim().to_owned(),
        latitude: body.latitude,
        longitude: body.longitude,
        rating,
        capacity_tons,
        drying_price,
        drying_and_storage_price,
    })
}

/// GET /api/v1/facilities — every listing, for the map and dashboards.
pub(super) async fn list_facilities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<FacilityItem>>>, ApiError> {
    let rows = ricelink_db::list_facilities(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(FacilityItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct FacilityVersion {
    pub version: u64,
}

/// GET /api/v1/facilities/version — the snapshot version bumped on every
/// facility write. Clients re-fetch the list only when it moves.
pub(super) async fn facility_version(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<FacilityVersion>> {
    Json(ApiResponse {
        data: FacilityVersion {
            version: state.feed.version(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// GET /api/v1/facilities/{id}
pub(super) async fn get_facility(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FacilityItem>>, ApiError> {
    let row = ricelink_db::get_facility(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "facility not found"))?;

    Ok(Json(ApiResponse {
        data: FacilityItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/admin/facilities
pub(super) async fn create_facility(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<FacilityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FacilityItem>>), ApiError> {
    let input = validate_facility(&req_id.0, &body)?;

    let row = ricelink_db::create_facility(&state.pool, &input)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    state.feed.publish();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: FacilityItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/admin/facilities/{id}
pub(super) async fn update_facility(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<FacilityRequest>,
) -> Result<Json<ApiResponse<FacilityItem>>, ApiError> {
    let input = validate_facility(&req_id.0, &body)?;

    let row = ricelink_db::update_facility(&state.pool, id, &input)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "facility not found"))?;
    state.feed.publish();

    Ok(Json(ApiResponse {
        data: FacilityItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct Deleted {
    pub deleted: bool,
}

/// DELETE /api/v1/admin/facilities/{id}
pub(super) async fn delete_facility(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let deleted = ricelink_db::delete_facility(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(req_id.0, "not_found", "facility not found"));
    }
    state.feed.publish();

    Ok(Json(ApiResponse {
        data: Deleted { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
