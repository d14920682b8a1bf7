//! Shipping company handlers: public listing, admin CRUD.

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
pub(super) struct ShippingCompanyItem {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub image_url: Option<String>,
    pub price_per_km: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<ricelink_db::ShippingCompanyRow> for ShippingCompanyItem {
    fn from(row: ricelink_db::ShippingCompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            image_url: row.image_url,
            price_per_km: row.price_per_km,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ShippingCompanyRequest {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price_per_km: Decimal,
}

fn validate_company(
    req_id: &str,
    body: &ShippingCompanyRequest,
) -> Result<ricelink_db::NewShippingCompany, ApiError> {
    let name = body.name.trim().to_owned();
    if name.is_empty() || name.len() > 200 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "name must be 1–200 characters",
        ));
    }
    if body.price_per_km < Decimal::ZERO {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "price_per_km must not be negative",
        ));
    }

    Ok(ricelink_db::NewShippingCompany {
        name,
        address: body.address.trim().to_owned(),
        image_url: body.image_url.clone(),
        price_per_km: body.price_per_km,
    })
}

/// GET /api/v1/shipping-companies
pub(super) async fn list_shipping_companies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ShippingCompanyItem>>>, ApiError> {
    let rows = ricelink_db::list_shipping_companies(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ShippingCompanyItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/admin/shipping-companies
pub(super) async fn create_shipping_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ShippingCompanyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShippingCompanyItem>>), ApiError> {
    let input = validate_company(&req_id.0, &body)?;

    let row = ricelink_db::create_shipping_company(&state.pool, &input)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ShippingCompanyItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/admin/shipping-companies/{id}
pub(super) async fn update_shipping_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<ShippingCompanyRequest>,
) -> Result<Json<ApiResponse<ShippingCompanyItem>>, ApiError> {
    let input = validate_company(&req_id.0, &body)?;

    let row = ricelink_db::update_shipping_company(&state.pool, id, &input)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "not_found", "shipping company not found")
        })?;

    Ok(Json(ApiResponse {
        data: ShippingCompanyItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct Deleted {
    pub deleted: bool,
}

/// DELETE /api/v1/admin/shipping-companies/{id}
pub(super) async fn delete_shipping_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let deleted = ricelink_db::delete_shipping_company(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "shipping company not found",
        ));
    }

    Ok(Json(ApiResponse {
        data: Deleted { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
