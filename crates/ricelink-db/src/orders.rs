//! Database operations for the `orders` table.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ricelink_core::{
    MoistureType, NewOrder, Order, OrderStatus, PaymentMethod, PaymentStatus, ServiceType,
};

use crate::DbError;

/// A row from the `orders` table. Enum columns are stored as text and
/// validated on the way back out in [`OrderRow::into_order`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_name: String,
    pub phone_number: String,
    pub item: String,
    pub quantity: i32,
    pub status: String,
    pub customer_address: String,
    pub capacity_tons: f64,
    pub facility_id: Uuid,
    pub facility_name: String,
    pub shipping_company: String,
    pub service_type: String,
    pub service_price: Decimal,
    pub moisture_type: Option<String>,
    pub moisture_value: Option<String>,
    pub storage_days: Option<i32>,
    pub delivery_date: NaiveDate,
    pub delivery_slot: String,
    pub payment_method: String,
    pub price_per_km: Decimal,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    /// Converts the row into the domain type, rejecting enum values the
    /// domain no longer recognizes.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] if an enum column fails to parse.
    pub fn into_order(self) -> Result<Order, DbError> {
        Ok(Order {
            id: self.id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            item: self.item,
            quantity: self.quantity,
            status: self.status.parse::<OrderStatus>()?,
            customer_address: self.customer_address,
            capacity_tons: self.capacity_tons,
            facility_id: self.facility_id,
            facility_name: self.facility_name,
            shipping_company: self.shipping_company,
            service_type: self.service_type.parse::<ServiceType>()?,
            service_price: self.service_price,
            moisture_type: self
                .moisture_type
                .as_deref()
                .map(str::parse::<MoistureType>)
                .transpose()?,
            moisture_value: self.moisture_value,
            storage_days: self.storage_days,
            delivery_date: self.delivery_date,
            delivery_slot: self.delivery_slot,
            payment_method: self.payment_method.parse::<PaymentMethod>()?,
            price_per_km: self.price_per_km,
            payment_status: self.payment_status.parse::<PaymentStatus>()?,
            created_at: self.created_at,
        })
    }
}

const ORDER_COLUMNS: &str =
    "id, customer_name, phone_number, item, quantity, status, customer_address, \
     capacity_tons, facility_id, facility_name, shipping_company, service_type, \
     service_price, moisture_type, moisture_value, storage_days, delivery_date, \
     delivery_slot, payment_method, price_per_km, payment_status, created_at";

/// Inserts the order produced by booking orchestration and returns the
/// stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_order(pool: &PgPool, input: &NewOrder) -> Result<OrderRow, DbError> {
    let sql = format!(
        "INSERT INTO orders \
             (customer_name, phone_number, item, quantity, status, customer_address, \
              capacity_tons, facility_id, facility_name, shipping_company, service_type, \
              service_price, moisture_type, moisture_value, storage_days, delivery_date, \
              delivery_slot, payment_method, price_per_km, payment_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20) \
         RETURNING {ORDER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(&input.customer_name)
        .bind(&input.phone_number)
        .bind(&input.item)
        .bind(input.quantity)
        .bind(input.status.as_str())
        .bind(&input.customer_address)
        .bind(input.capacity_tons)
        .bind(input.facility_id)
        .bind(&input.facility_name)
        .bind(&input.shipping_company)
        .bind(input.service_type.as_str())
        .bind(input.service_price)
        .bind(input.moisture_type.map(MoistureType::as_str))
        .bind(&input.moisture_value)
        .bind(input.storage_days)
        .bind(input.delivery_date)
        .bind(&input.delivery_slot)
        .bind(input.payment_method.as_str())
        .bind(input.price_per_km)
        .bind(input.payment_status.as_str())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Returns the most recent orders, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_orders(pool: &PgPool, limit: i64) -> Result<Vec<OrderRow>, DbError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1");
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns a customer's orders, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_by_customer(
    pool: &PgPool,
    customer_name: &str,
) -> Result<Vec<OrderRow>, DbError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_name = $1 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(customer_name)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns a facility's orders, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders_by_facility(
    pool: &PgPool,
    facility_id: Uuid,
) -> Result<Vec<OrderRow>, DbError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE facility_id = $1 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(facility_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Advances an order's lifecycle status. Returns the updated row, or
/// `None` if no order with that id exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_order_status(
    pool: &PgPool,
    id: Uuid,
    status: OrderStatus,
) -> Result<Option<OrderRow>, DbError> {
    let sql = format!("UPDATE orders SET status = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Marks an order paid or unpaid. Returns the updated row, or `None` if no
/// order with that id exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_payment_status(
    pool: &PgPool,
    id: Uuid,
    payment_status: PaymentStatus,
) -> Result<Option<OrderRow>, DbError> {
    let sql =
        format!("UPDATE orders SET payment_status = $1 WHERE id = $2 RETURNING {ORDER_COLUMNS}");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(payment_status.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Deletes an order. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_order(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Per-facility payment aggregation for the admin dashboard. Amounts are
/// `service_price × capacity_tons` per order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentSummaryRow {
    pub facility_id: Uuid,
    pub facility_name: String,
    pub total_orders: i64,
    pub paid_orders: i64,
    pub unpaid_orders: i64,
    pub paid_amount: Decimal,
    pub unpaid_amount: Decimal,
}

/// Returns the per-facility payment summary, largest order count first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn payment_summary(pool: &PgPool) -> Result<Vec<PaymentSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, PaymentSummaryRow>(
        "SELECT facility_id, \
                facility_name, \
                COUNT(*) AS total_orders, \
                COUNT(*) FILTER (WHERE payment_status = 'paid') AS paid_orders, \
                COUNT(*) FILTER (WHERE payment_status = 'unpaid') AS unpaid_orders, \
                COALESCE(SUM(service_price * capacity_tons::numeric) \
                    FILTER (WHERE payment_status = 'paid'), 0) AS paid_amount, \
                COALESCE(SUM(service_price * capacity_tons::numeric) \
                    FILTER (WHERE payment_status = 'unpaid'), 0) AS unpaid_amount \
         FROM orders \
         GROUP BY facility_id, facility_name \
         ORDER BY total_orders DESC, facility_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
