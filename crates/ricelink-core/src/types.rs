//! Domain types shared across the RiceLink crates.
//!
//! The original data shapes mixed optional fields liberally; here every
//! entity is an explicit record with typed enums for the closed string
//! unions (service type, payment method, order/payment status, moisture
//! type). Repositories and API handlers convert at the boundary via
//! [`std::str::FromStr`] and reject unknown values.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A string failed to parse into one of the closed enums below.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct InvalidEnumValue {
    pub kind: &'static str,
    pub value: String,
}

impl InvalidEnumValue {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// A geographic point in WGS-84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Account roles. Farmers book dryings, shops operate facilities, admins
/// manage everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Shop,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Shop => "shop",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Self::Farmer),
            "shop" => Ok(Self::Shop),
            "admin" => Ok(Self::Admin),
            _ => Err(InvalidEnumValue::new("role", s)),
        }
    }
}

/// A registered account. Credentials live in the repository layer only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A rice-drying facility listing.
///
/// `rating` is 0–5; `capacity_tons` is the daily drying limit the
/// matching engine filters on. Prices are VND per ton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub district: String,
    pub address: String,
    pub location: GeoPoint,
    pub rating: f64,
    pub capacity_tons: i64,
    pub drying_price: Decimal,
    pub drying_and_storage_price: Decimal,
}

/// A shipping company offering per-km transport to a facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingCompany {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub image_url: Option<String>,
    pub price_per_km: Decimal,
}

/// The service a customer books at a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Drying,
    DryingAndStorage,
}

impl ServiceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drying => "drying",
            Self::DryingAndStorage => "drying_and_storage",
        }
    }

    /// Vietnamese display label, used in the order summary line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Drying => "Sấy lúa",
            Self::DryingAndStorage => "Sấy và bảo quản lúa",
        }
    }
}

impl FromStr for ServiceType {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drying" => Ok(Self::Drying),
            "drying_and_storage" => Ok(Self::DryingAndStorage),
            _ => Err(InvalidEnumValue::new("service type", s)),
        }
    }
}

/// Order lifecycle status, advanced by facility operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(InvalidEnumValue::new("order status", s)),
        }
    }
}

/// Whether an order has been paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(Self::Paid),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(InvalidEnumValue::new("payment status", s)),
        }
    }
}

/// Payment methods offered on the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Momo,
    Vnpay,
    Zalopay,
    ViettelMoney,
    Bank,
    Visa,
    Master,
    Icb,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Momo => "momo",
            Self::Vnpay => "vnpay",
            Self::Zalopay => "zalopay",
            Self::ViettelMoney => "viettel_money",
            Self::Bank => "bank",
            Self::Visa => "visa",
            Self::Master => "master",
            Self::Icb => "icb",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "momo" => Ok(Self::Momo),
            "vnpay" => Ok(Self::Vnpay),
            "zalopay" => Ok(Self::Zalopay),
            "viettel_money" => Ok(Self::ViettelMoney),
            "bank" => Ok(Self::Bank),
            "visa" => Ok(Self::Visa),
            "master" => Ok(Self::Master),
            "icb" => Ok(Self::Icb),
            _ => Err(InvalidEnumValue::new("payment method", s)),
        }
    }
}

/// How the moisture percentage on an order was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoistureType {
    Unconfirmed,
    Estimated,
    Actual,
}

impl MoistureType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unconfirmed => "unconfirmed",
            Self::Estimated => "estimated",
            Self::Actual => "actual",
        }
    }
}

impl FromStr for MoistureType {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unconfirmed" => Ok(Self::Unconfirmed),
            "estimated" => Ok(Self::Estimated),
            "actual" => Ok(Self::Actual),
            _ => Err(InvalidEnumValue::new("moisture type", s)),
        }
    }
}

/// Input record for a new order, produced by booking orchestration.
/// The repository assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone_number: String,
    /// Display summary, e.g. `"Sấy lúa 20 Tấn · Lò Sấy Tân Hồng"`.
    pub item: String,
    pub quantity: i32,
    pub status: OrderStatus,
    pub customer_address: String,
    pub capacity_tons: f64,
    pub facility_id: Uuid,
    pub facility_name: String,
    pub shipping_company: String,
    pub service_type: ServiceType,
    pub service_price: Decimal,
    pub moisture_type: Option<MoistureType>,
    pub moisture_value: Option<String>,
    pub storage_days: Option<i32>,
    pub delivery_date: NaiveDate,
    pub delivery_slot: String,
    pub payment_method: PaymentMethod,
    pub price_per_km: Decimal,
    pub payment_status: PaymentStatus,
}

/// A persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub phone_number: String,
    pub item: String,
    pub quantity: i32,
    pub status: OrderStatus,
    pub customer_address: String,
    pub capacity_tons: f64,
    pub facility_id: Uuid,
    pub facility_name: String,
    pub shipping_company: String,
    pub service_type: ServiceType,
    pub service_price: Decimal,
    pub moisture_type: Option<MoistureType>,
    pub moisture_value: Option<String>,
    pub storage_days: Option<i32>,
    pub delivery_date: NaiveDate,
    pub delivery_slot: String,
    pub payment_method: PaymentMethod,
    pub price_per_km: Decimal,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_round_trips_through_str() {
        for method in [
            PaymentMethod::Momo,
            PaymentMethod::Vnpay,
            PaymentMethod::Zalopay,
            PaymentMethod::ViettelMoney,
            PaymentMethod::Bank,
            PaymentMethod::Visa,
            PaymentMethod::Master,
            PaymentMethod::Icb,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>(), Ok(method));
        }
    }

    #[test]
    fn unknown_order_status_is_rejected() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.value, "shipped");
    }

    #[test]
    fn service_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&ServiceType::DryingAndStorage).expect("serialize");
        assert_eq!(json, "\"drying_and_storage\"");
    }

    #[test]
    fn geo_point_display_is_lat_comma_lon() {
        let p = GeoPoint::new(10.45, 105.63);
        assert_eq!(p.to_string(), "10.45,105.63");
    }
}
