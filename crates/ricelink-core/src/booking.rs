//! Booking orchestration: precondition checks and order construction.
//!
//! Selecting a facility from the match results never creates an order by
//! itself; the caller collects the booking form, the chosen candidate, and
//! the customer's session state, then runs [`confirm_booking`]. Checks run
//! in a fixed order and the first failure wins, so the user is told about
//! exactly one missing field at a time, matching the booking form's flow.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{
    MoistureType, NewOrder, OrderStatus, PaymentMethod, PaymentStatus, ServiceType,
};

/// Shipping-company name recorded when the customer transports the rice
/// themselves. Per-km price is zero in that case.
pub const OWN_SHIPPING_SENTINEL: &str = "Đã có đơn vị vận chuyển";

/// Snapshot of the facility the customer picked from the ranked list,
/// taken at confirmation time so later listing edits cannot change the
/// agreed price.
#[derive(Debug, Clone)]
pub struct BookingCandidate {
    pub facility_id: Uuid,
    pub facility_name: String,
    pub drying_price: Decimal,
}

/// The shipping company chosen on the form.
#[derive(Debug, Clone)]
pub struct ShippingChoice {
    pub name: String,
    pub price_per_km: Decimal,
}

/// Booking form state at the moment of confirmation.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub authenticated: bool,
    pub customer_name: String,
    pub phone_number: String,
    pub customer_address: String,
    pub capacity_tons: f64,
    pub has_own_shipping: bool,
    pub shipping_company: Option<ShippingChoice>,
    pub service_type: Option<ServiceType>,
    pub moisture_type: Option<MoistureType>,
    pub moisture_value: Option<String>,
    pub storage_days: Option<i32>,
    pub delivery_date: Option<chrono::NaiveDate>,
    pub delivery_slot: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

/// A booking precondition failed. Messages are the user-facing Vietnamese
/// prompts shown on the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Vui lòng đăng nhập trước khi đặt lịch.")]
    NotAuthenticated,
    #[error("Vui lòng nhập tên khách hàng trước.")]
    MissingCustomerName,
    #[error("Vui lòng nhập số điện thoại khách hàng trước.")]
    MissingPhoneNumber,
    #[error("Số điện thoại không hợp lệ: {0}")]
    InvalidPhoneNumber(String),
    #[error("Vui lòng chọn đơn vị vận chuyển hoặc đánh dấu đã có đơn vị vận chuyển.")]
    MissingShippingChoice,
    #[error("Vui lòng chọn ngày mang lúa đến sấy.")]
    MissingDeliveryDate,
    #[error("Vui lòng chọn giờ mang lúa đến sấy.")]
    MissingDeliverySlot,
    #[error("Vui lòng chọn phương thức thanh toán.")]
    MissingPaymentMethod,
    #[error("Vui lòng nhập sản lượng lúa (Tấn) trước khi chọn cơ sở sấy.")]
    InvalidCapacity,
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\+84|0)\d{9,10}$").expect("phone pattern is a valid literal")
    })
}

/// Validates booking preconditions in order (first failure wins) and, on
/// success, constructs the order record for the repository to persist.
///
/// # Errors
///
/// Returns the first failing [`BookingError`] precondition.
pub fn confirm_booking(
    candidate: &BookingCandidate,
    form: &BookingForm,
) -> Result<NewOrder, BookingError> {
    if !form.authenticated {
        return Err(BookingError::NotAuthenticated);
    }
    let customer_name = form.customer_name.trim();
    if customer_name.is_empty() {
        return Err(BookingError::MissingCustomerName);
    }
    let phone_number = form.phone_number.trim();
    if phone_number.is_empty() {
        return Err(BookingError::MissingPhoneNumber);
    }
    if !phone_pattern().is_match(phone_number) {
        return Err(BookingError::InvalidPhoneNumber(phone_number.to_owned()));
    }
    let shipping = if form.has_own_shipping {
        None
    } else {
        match &form.shipping_company {
            Some(choice) => Some(choice),
            None => return Err(BookingError::MissingShippingChoice),
        }
    };
    let Some(delivery_date) = form.delivery_date else {
        return Err(BookingError::MissingDeliveryDate);
    };
    let delivery_slot = match form.delivery_slot.as_deref().map(str::trim) {
        Some(slot) if !slot.is_empty() => slot.to_owned(),
        _ => return Err(BookingError::MissingDeliverySlot),
    };
    let Some(payment_method) = form.payment_method else {
        return Err(BookingError::MissingPaymentMethod);
    };
    if !(form.capacity_tons.is_finite() && form.capacity_tons > 0.0) {
        return Err(BookingError::InvalidCapacity);
    }

    let service_type = form.service_type.unwrap_or(ServiceType::Drying);
    let shipping_company = shipping.map_or_else(
        || OWN_SHIPPING_SENTINEL.to_owned(),
        |choice| choice.name.clone(),
    );
    let price_per_km = shipping.map_or(Decimal::ZERO, |choice| choice.price_per_km);
    // Storage days only make sense for the drying-and-storage service.
    let storage_days = match service_type {
        ServiceType::DryingAndStorage => form.storage_days,
        ServiceType::Drying => None,
    };

    Ok(NewOrder {
        customer_name: customer_name.to_owned(),
        phone_number: phone_number.to_owned(),
        item: format!(
            "{} {} Tấn · {}",
            service_type.label(),
            form.capacity_tons,
            candidate.facility_name
        ),
        quantity: 1,
        status: OrderStatus::Pending,
        customer_address: form.customer_address.trim().to_owned(),
        capacity_tons: form.capacity_tons,
        facility_id: candidate.facility_id,
        facility_name: candidate.facility_name.clone(),
        shipping_company,
        service_type,
        service_price: candidate.drying_price,
        moisture_type: form.moisture_type,
        moisture_value: form.moisture_value.clone(),
        storage_days,
        delivery_date,
        delivery_slot,
        payment_method,
        price_per_km,
        payment_status: PaymentStatus::Unpaid,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    fn candidate() -> BookingCandidate {
        BookingCandidate {
            facility_id: Uuid::new_v4(),
            facility_name: "Lò Sấy Tân Hồng".to_owned(),
            drying_price: Decimal::new(90_000, 0),
        }
    }

    fn complete_form() -> BookingForm {
        BookingForm {
            authenticated: true,
            customer_name: "Nguyễn Văn A".to_owned(),
            phone_number: "0912345678".to_owned(),
            customer_address: "Xã Thanh Mỹ, Huyện Thanh Bình, Đồng Tháp".to_owned(),
            capacity_tons: 20.0,
            has_own_shipping: false,
            shipping_company: Some(ShippingChoice {
                name: "Vận tải Hoàng Minh".to_owned(),
                price_per_km: Decimal::new(180_000, 0),
            }),
            service_type: Some(ServiceType::Drying),
            moisture_type: Some(MoistureType::Estimated),
            moisture_value: Some("22%".to_owned()),
            storage_days: None,
            delivery_date: NaiveDate::from_ymd_opt(2025, 11, 3),
            delivery_slot: Some("7-8".to_owned()),
            payment_method: Some(PaymentMethod::Momo),
        }
    }

    #[test]
    fn complete_form_builds_pending_unpaid_order() {
        let candidate = candidate();
        let order = confirm_booking(&candidate, &complete_form()).expect("booking should pass");

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.facility_id, candidate.facility_id);
        assert_eq!(order.service_price, Decimal::new(90_000, 0));
        assert_eq!(order.price_per_km, Decimal::new(180_000, 0));
        assert_eq!(order.quantity, 1);
        assert_eq!(order.item, "Sấy lúa 20 Tấn · Lò Sấy Tân Hồng");
    }

    #[test]
    fn preconditions_fail_in_declared_order() {
        let candidate = candidate();

        let mut form = complete_form();
        form.authenticated = false;
        form.customer_name = String::new();
        assert_eq!(
            confirm_booking(&candidate, &form),
            Err(BookingError::NotAuthenticated),
            "authentication is checked before the name"
        );

        let mut form = complete_form();
        form.customer_name = "   ".to_owned();
        form.phone_number = String::new();
        assert_eq!(
            confirm_booking(&candidate, &form),
            Err(BookingError::MissingCustomerName)
        );

        let mut form = complete_form();
        form.shipping_company = None;
        form.delivery_date = None;
        assert_eq!(
            confirm_booking(&candidate, &form),
            Err(BookingError::MissingShippingChoice)
        );

        let mut form = complete_form();
        form.delivery_slot = None;
        form.payment_method = None;
        assert_eq!(
            confirm_booking(&candidate, &form),
            Err(BookingError::MissingDeliverySlot)
        );
    }

    #[test]
    fn malformed_phone_number_is_rejected() {
        let mut form = complete_form();
        form.phone_number = "12-34".to_owned();
        assert!(matches!(
            confirm_booking(&candidate(), &form),
            Err(BookingError::InvalidPhoneNumber(_))
        ));
    }

    #[test]
    fn plus_84_phone_numbers_are_accepted() {
        let mut form = complete_form();
        form.phone_number = "+84912345678".to_owned();
        assert!(confirm_booking(&candidate(), &form).is_ok());
    }

    #[test]
    fn own_shipping_uses_sentinel_and_zero_per_km() {
        let mut form = complete_form();
        form.has_own_shipping = true;
        form.shipping_company = None;

        let order = confirm_booking(&candidate(), &form).expect("own shipping is sufficient");
        assert_eq!(order.shipping_company, OWN_SHIPPING_SENTINEL);
        assert_eq!(order.price_per_km, Decimal::ZERO);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut form = complete_form();
        form.capacity_tons = 0.0;
        assert_eq!(
            confirm_booking(&candidate(), &form),
            Err(BookingError::InvalidCapacity)
        );
    }

    #[test]
    fn storage_days_dropped_for_plain_drying() {
        let mut form = complete_form();
        form.service_type = Some(ServiceType::Drying);
        form.storage_days = Some(14);
        let order = confirm_booking(&candidate(), &form).expect("booking should pass");
        assert_eq!(order.storage_days, None);

        form.service_type = Some(ServiceType::DryingAndStorage);
        let order = confirm_booking(&candidate(), &form).expect("booking should pass");
        assert_eq!(order.storage_days, Some(14));
    }
}
