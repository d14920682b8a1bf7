//! Database operations for the `shipping_companies` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ricelink_core::ShippingCompany;

use crate::DbError;

/// Input record for creating or updating a shipping company.
#[derive(Debug, Clone)]
pub struct NewShippingCompany {
    pub name: String,
    pub address: String,
    pub image_url: Option<String>,
    pub price_per_km: Decimal,
}

/// A row from the `shipping_companies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShippingCompanyRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub image_url: Option<String>,
    pub price_per_km: Decimal,
    pub created_at: DateTime<Utc>,
}

impl ShippingCompanyRow {
    #[must_use]
    pub fn into_shipping_company(self) -> ShippingCompany {
        ShippingCompany {
            id: self.id,
            name: self.name,
            address: self.address,
            image_url: self.image_url,
            price_per_km: self.price_per_km,
        }
    }
}

/// Returns all shipping companies ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_shipping_companies(pool: &PgPool) -> Result<Vec<ShippingCompanyRow>, DbError> {
    let rows = sqlx::query_as::<_, ShippingCompanyRow>(
        "SELECT id, name, address, image_url, price_per_km, created_at \
         FROM shipping_companies \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single shipping company by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_shipping_company(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ShippingCompanyRow>, DbError> {
    let row = sqlx::query_as::<_, ShippingCompanyRow>(
        "SELECT id, name, address, image_url, price_per_km, created_at \
         FROM shipping_companies \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a shipping company and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_shipping_company(
    pool: &PgPool,
    input: &NewShippingCompany,
) -> Result<ShippingCompanyRow, DbError> {
    let row = sqlx::query_as::<_, ShippingCompanyRow>(
        "INSERT INTO shipping_companies (name, address, image_url, price_per_km) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, name, address, image_url, price_per_km, created_at",
    )
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.image_url)
    .bind(input.price_per_km)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replaces a shipping company's fields. Returns the updated row, or
/// `None` if no company with that id exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_shipping_company(
    pool: &PgPool,
    id: Uuid,
    input: &NewShippingCompany,
) -> Result<Option<ShippingCompanyRow>, DbError> {
    let row = sqlx::query_as::<_, ShippingCompanyRow>(
        "UPDATE shipping_companies \
         SET name = $1, address = $2, image_url = $3, price_per_km = $4 \
         WHERE id = $5 \
         RETURNING id, name, address, image_url, price_per_km, created_at",
    )
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.image_url)
    .bind(input.price_per_km)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes a shipping company. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_shipping_company(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM shipping_companies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
