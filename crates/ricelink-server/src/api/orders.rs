//! Order handlers: booking confirmation, listings, status transitions,
//! the payment summary, and the per-order chat.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ricelink_core::{
    confirm_booking, BookingCandidate, BookingForm, MoistureType, Order, OrderStatus,
    PaymentMethod, PaymentStatus, ServiceType, ShippingChoice,
};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateOrderRequest {
    /// The authenticated customer's account. Booking requires a login.
    pub account_id: Option<Uuid>,
    pub facility_id: Uuid,
    pub customer_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub customer_address: String,
    pub capacity_tons: f64,
    #[serde(default)]
    pub has_own_shipping: bool,
    #[serde(default)]
    pub shipping_company_id: Option<Uuid>,
    #[serde(default)]
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub moisture_type: Option<MoistureType>,
    #[serde(default)]
    pub moisture_value: Option<String>,
    #[serde(default)]
    pub storage_days: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
    pub delivery_slot: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

fn order_from_row(req_id: &str, row: ricelink_db::OrderRow) -> Result<Order, ApiError> {
    row.into_order()
        .map_err(|e| map_db_error(req_id.to_owned(), &e))
}

/// POST /api/v1/orders — confirm a booking for a selected facility.
///
/// Runs the booking preconditions (first failure wins) against the current
/// session and form state, then persists the constructed order.
pub(super) async fn create_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let rid = req_id.0;

    let facility = ricelink_db::get_facility(&state.pool, body.facility_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid.clone(), "not_found", "Cơ sở sấy không tồn tại."))?;

    let shipping_company = match body.shipping_company_id {
        Some(id) => Some(
            ricelink_db::get_shipping_company(&state.pool, id)
                .await
                .map_err(|e| map_db_error(rid.clone(), &e))?
                .ok_or_else(|| {
                    ApiError::new(rid.clone(), "not_found", "Đơn vị vận chuyển không tồn tại.")
                })?,
        ),
        None => None,
    };

    let authenticated = match body.account_id {
        Some(account_id) => ricelink_db::get_account(&state.pool, account_id)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?
            .is_some(),
        None => false,
    };

    let candidate = BookingCandidate {
        facility_id: facility.id,
        facility_name: facility.name.clone(),
        drying_price: facility.drying_price,
    };
    let form = BookingForm {
        authenticated,
        customer_name: body.customer_name,
        phone_number: body.phone_number,
        customer_address: body.customer_address,
        capacity_tons: body.capacity_tons,
        has_own_shipping: body.has_own_shipping,
        shipping_company: shipping_company.map(|c| ShippingChoice {
            name: c.name,
            price_per_km: c.price_per_km,
        }),
        service_type: body.service_type,
        moisture_type: body.moisture_type,
        moisture_value: body.moisture_value,
        storage_days: body.storage_days,
        delivery_date: body.delivery_date,
        delivery_slot: body.delivery_slot,
        payment_method: body.payment_method,
    };

    let new_order = confirm_booking(&candidate, &form)
        .map_err(|e| ApiError::new(rid.clone(), "validation_error", e.to_string()))?;

    let row = ricelink_db::create_order(&state.pool, &new_order)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let order = order_from_row(&rid, row)?;

    tracing::info!(order_id = %order.id, facility = %order.facility_name, "order created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: order,
            meta: ResponseMeta::new(rid),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct ListOrdersQuery {
    pub customer_name: Option<String>,
    pub facility_id: Option<Uuid>,
}

/// GET /api/v1/orders — a customer's or a facility's orders, newest first.
/// Exactly one filter is required; unfiltered listing is an admin concern.
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let rid = req_id.0;

    let rows = match (query.customer_name.as_deref(), query.facility_id) {
        (Some(name), None) => ricelink_db::list_orders_by_customer(&state.pool, name)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?,
        (None, Some(facility_id)) => {
            ricelink_db::list_orders_by_facility(&state.pool, facility_id)
                .await
                .map_err(|e| map_db_error(rid.clone(), &e))?
        }
        _ => {
            return Err(ApiError::new(
                rid,
                "validation_error",
                "provide exactly one of customer_name or facility_id",
            ))
        }
    };

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(order_from_row(&rid, row)?);
    }

    Ok(Json(ApiResponse {
        data: orders,
        meta: ResponseMeta::new(rid),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct RecentOrdersQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/admin/orders — most recent orders across all facilities.
pub(super) async fn list_recent_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecentOrdersQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let rid = req_id.0;
    let rows = ricelink_db::list_recent_orders(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(order_from_row(&rid, row)?);
    }

    Ok(Json(ApiResponse {
        data: orders,
        meta: ResponseMeta::new(rid),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PATCH /api/v1/admin/orders/{id}/status
pub(super) async fn update_order_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let rid = req_id.0;
    let row = ricelink_db::update_order_status(&state.pool, id, body.status)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid.clone(), "not_found", "order not found"))?;
    let order = order_from_row(&rid, row)?;

    Ok(Json(ApiResponse {
        data: order,
        meta: ResponseMeta::new(rid),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
}

/// PATCH /api/v1/admin/orders/{id}/payment
pub(super) async fn update_payment_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePaymentRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let rid = req_id.0;
    let row = ricelink_db::update_payment_status(&state.pool, id, body.payment_status)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid.clone(), "not_found", "order not found"))?;
    let order = order_from_row(&rid, row)?;

    Ok(Json(ApiResponse {
        data: order,
        meta: ResponseMeta::new(rid),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct Deleted {
    pub deleted: bool,
}

/// DELETE /api/v1/admin/orders/{id}
pub(super) async fn delete_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>, ApiError> {
    let deleted = ricelink_db::delete_order(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if !deleted {
        return Err(ApiError::new(req_id.0, "not_found", "order not found"));
    }

    Ok(Json(ApiResponse {
        data: Deleted { deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct PaymentSummaryItem {
    pub facility_id: Uuid,
    pub facility_name: String,
    pub total_orders: i64,
    pub paid_orders: i64,
    pub unpaid_orders: i64,
    pub paid_amount: Decimal,
    pub unpaid_amount: Decimal,
}

/// GET /api/v1/admin/payments/summary
pub(super) async fn payment_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<PaymentSummaryItem>>>, ApiError> {
    let rows = ricelink_db::payment_summary(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| PaymentSummaryItem {
            facility_id: row.facility_id,
            facility_name: row.facility_name,
            total_orders: row.total_orders,
            paid_orders: row.paid_orders,
            unpaid_orders: row.unpaid_orders,
            paid_amount: row.paid_amount,
            unpaid_amount: row.unpaid_amount,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessageItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub sender: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<ricelink_db::ChatMessageRow> for ChatMessageItem {
    fn from(row: ricelink_db::ChatMessageRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            sender: row.sender,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AppendMessageRequest {
    pub sender: String,
    pub body: String,
}

/// POST /api/v1/orders/{id}/messages
pub(super) async fn append_message(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<AppendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChatMessageItem>>), ApiError> {
    let rid = req_id.0;

    if !matches!(body.sender.as_str(), "client" | "shop") {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "sender must be 'client' or 'shop'",
        ));
    }
    let text = body.body.trim();
    if text.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "message body must not be empty",
        ));
    }

    let row = ricelink_db::append_chat_message(&state.pool, id, &body.sender, text)
        .await
        .map_err(|e| match &e {
            // Foreign-key violation: the order does not exist.
            ricelink_db::DbError::Sqlx(sqlx::Error::Database(db))
                if db.code().as_deref() == Some("23503") =>
            {
                ApiError::new(rid.clone(), "not_found", "order not found")
            }
            _ => map_db_error(rid.clone(), &e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ChatMessageItem::from(row),
            meta: ResponseMeta::new(rid),
        }),
    ))
}

/// GET /api/v1/orders/{id}/messages
pub(super) async fn list_messages(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChatMessageItem>>>, ApiError> {
    let rows = ricelink_db::list_chat_messages(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ChatMessageItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
