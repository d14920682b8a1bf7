//! Database operations for the `facilities` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ricelink_core::{Facility, GeoPoint};

use crate::DbError;

/// Input record for creating or fully updating a facility listing.
#[derive(Debug, Clone)]
pub struct NewFacility {
    pub name: String,
    pub district: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: f64,
    pub capacity_tons: i64,
    pub drying_price: Decimal,
    pub drying_and_storage_price: Decimal,
}

/// A row from the `facilities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacilityRow {
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

impl FacilityRow {
    /// Converts the row into the domain type consumed by the matching engine.
    #[must_use]
    pub fn into_facility(self) -> Facility {
        Facility {
            id: self.id,
            name: self.name,
            district: self.district,
            address: self.address,
            location: GeoPoint::new(self.latitude, self.longitude),
            rating: self.rating,
            capacity_tons: self.capacity_tons,
            drying_price: self.drying_price,
            drying_and_storage_price: self.drying_and_storage_price,
        }
    }
}

/// Returns all facilities ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_facilities(pool: &PgPool) -> Result<Vec<FacilityRow>, DbError> {
    let rows = sqlx::query_as::<_, FacilityRow>(
        "SELECT id, name, district, address, latitude, longitude, rating, capacity_tons, \
                drying_price, drying_and_storage_price, created_at, updated_at \
         FROM facilities \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single facility by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_facility(pool: &PgPool, id: Uuid) -> Result<Option<FacilityRow>, DbError> {
    let row = sqlx::query_as::<_, FacilityRow>(
        "SELECT id, name, district, address, latitude, longitude, rating, capacity_tons, \
                drying_price, drying_and_storage_price, created_at, updated_at \
         FROM facilities \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a facility listing and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_facility(pool: &PgPool, input: &NewFacility) -> Result<FacilityRow, DbError> {
    let row = sqlx::query_as::<_, FacilityRow>(
        "INSERT INTO facilities \
             (name, district, address, latitude, longitude, rating, capacity_tons, \
              drying_price, drying_and_storage_price) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id, name, district, address, latitude, longitude, rating, capacity_tons, \
                   drying_price, drying_and_storage_price, created_at, updated_at",
    )
    .bind(&input.name)
    .bind(&input.district)
    .bind(&input.address)
    .bind(input.latitude)
    .bind(input.longitude)
    .bind(input.rating)
    .bind(input.capacity_tons)
    .bind(input.drying_price)
    .bind(input.drying_and_storage_price)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replaces a facility listing's editable fields. Returns the updated row,
/// or `None` if no facility with that id exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_facility(
    pool: &PgPool,
    id: Uuid,
    input: &NewFacility,
) -> Result<Option<FacilityRow>, DbError> {
    let row = sqlx::query_as::<_, FacilityRow>(
        "UPDATE facilities \
         SET name = $1, district = $2, address = $3, latitude = $4, longitude = $5, \
             rating = $6, capacity_tons = $7, drying_price = $8, \
             drying_and_storage_price = $9, updated_at = NOW() \
         WHERE id = $10 \
         RETURNING id, name, district, address, latitude, longitude, rating, capacity_tons, \
                   drying_price, drying_and_storage_price, created_at, updated_at",
    )
    .bind(&input.name)
    .bind(&input.district)
    .bind(&input.address)
    .bind(input.latitude)
    .bind(input.longitude)
    .bind(input.rating)
    .bind(input.capacity_tons)
    .bind(input.drying_price)
    .bind(input.drying_and_storage_price)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes a facility listing. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_facility(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM facilities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
