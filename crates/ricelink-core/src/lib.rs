//! Shared domain types, booking orchestration, and configuration for the
//! RiceLink marketplace.

use thiserror::Error;

pub mod app_config;
pub mod booking;
mod config;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use booking::{
    confirm_booking, BookingCandidate, BookingError, BookingForm, ShippingChoice,
    OWN_SHIPPING_SENTINEL,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    Account, Facility, GeoPoint, InvalidEnumValue, MoistureType, NewOrder, Order, OrderStatus,
    PaymentMethod, PaymentStatus, Role, ServiceType, ShippingCompany,
};

/// Errors raised while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but could not be parsed.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
