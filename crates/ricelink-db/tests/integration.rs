//! Repository integration tests. Each test gets a fresh migrated database
//! via `#[sqlx::test]`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ricelink_core::{
    MoistureType, NewOrder, OrderStatus, PaymentMethod, PaymentStatus, Role, ServiceType,
};
use ricelink_db::{facilities::NewFacility, shipping::NewShippingCompany};

fn new_facility(name: &str) -> NewFacility {
    NewFacility {
        name: name.to_owned(),
        district: "Tháp Mười".to_owned(),
        address: "Ấp 4, Xã Mỹ Hòa, Đồng Tháp".to_owned(),
        latitude: 10.5356,
        longitude: 105.8421,
        rating: 4.3,
        capacity_tons: 800,
        drying_price: Decimal::new(85_000, 0),
        drying_and_storage_price: Decimal::new(110_000, 0),
    }
}

fn new_order(customer: &str, facility_id: Uuid, facility_name: &str) -> NewOrder {
    NewOrder {
        customer_name: customer.to_owned(),
        phone_number: "0912345678".to_owned(),
        item: format!("Sấy lúa 20 Tấn · {facility_name}"),
        quantity: 1,
        status: OrderStatus::Pending,
        customer_address: "Xã Thanh Mỹ, Đồng Tháp".to_owned(),
        capacity_tons: 20.0,
        facility_id,
        facility_name: facility_name.to_owned(),
        shipping_company: "Vận tải Hoàng Minh".to_owned(),
        service_type: ServiceType::Drying,
        service_price: Decimal::new(85_000, 0),
        moisture_type: Some(MoistureType::Estimated),
        moisture_value: Some("21%".to_owned()),
        storage_days: None,
        delivery_date: NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid date"),
        delivery_slot: "7-8".to_owned(),
        payment_method: PaymentMethod::Momo,
        price_per_km: Decimal::new(180_000, 0),
        payment_status: PaymentStatus::Unpaid,
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn facility_create_get_list_round_trip(pool: PgPool) {
    let created = ricelink_db::create_facility(&pool, &new_facility("Lò Sấy Số 1"))
        .await
        .expect("create facility");

    let fetched = ricelink_db::get_facility(&pool, created.id)
        .await
        .expect("get facility")
        .expect("facility exists");
    assert_eq!(fetched.name, "Lò Sấy Số 1");
    assert_eq!(fetched.capacity_tons, 800);
    assert_eq!(fetched.drying_price, Decimal::new(85_000, 0));

    let facility = fetched.into_facility();
    assert!((facility.location.lat - 10.5356).abs() < 1e-9);
    assert!((facility.location.lon - 105.8421).abs() < 1e-9);

    let all = ricelink_db::list_facilities(&pool).await.expect("list");
    assert_eq!(all.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn facility_update_and_delete(pool: PgPool) {
    let created = ricelink_db::create_facility(&pool, &new_facility("Lò Sấy Cũ"))
        .await
        .expect("create facility");

    let mut changes = new_facility("Lò Sấy Mới");
    changes.capacity_tons = 1_200;
    let updated = ricelink_db::update_facility(&pool, created.id, &changes)
        .await
        .expect("update facility")
        .expect("facility exists");
    assert_eq!(updated.name, "Lò Sấy Mới");
    assert_eq!(updated.capacity_tons, 1_200);

    let missing = ricelink_db::update_facility(&pool, Uuid::new_v4(), &changes)
        .await
        .expect("update should not fail");
    assert!(missing.is_none());

    assert!(ricelink_db::delete_facility(&pool, created.id)
        .await
        .expect("delete"));
    assert!(!ricelink_db::delete_facility(&pool, created.id)
        .await
        .expect("second delete"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn order_lifecycle_and_listings(pool: PgPool) {
    let facility = ricelink_db::create_facility(&pool, &new_facility("Lò Sấy Tân Hồng"))
        .await
        .expect("create facility");

    let created =
        ricelink_db::create_order(&pool, &new_order("Nguyễn Văn A", facility.id, &facility.name))
            .await
            .expect("create order");
    assert_eq!(created.status, "pending");
    assert_eq!(created.payment_status, "unpaid");

    let order = created.clone().into_order().expect("row parses into domain order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::Momo);
    assert_eq!(order.moisture_type, Some(MoistureType::Estimated));

    let confirmed = ricelink_db::update_order_status(&pool, created.id, OrderStatus::Confirmed)
        .await
        .expect("update status")
        .expect("order exists");
    assert_eq!(confirmed.status, "confirmed");

    let paid = ricelink_db::update_payment_status(&pool, created.id, PaymentStatus::Paid)
        .await
        .expect("update payment")
        .expect("order exists");
    assert_eq!(paid.payment_status, "paid");

    let by_customer = ricelink_db::list_orders_by_customer(&pool, "Nguyễn Văn A")
        .await
        .expect("list by customer");
    assert_eq!(by_customer.len(), 1);

    let by_facility = ricelink_db::list_orders_by_facility(&pool, facility.id)
        .await
        .expect("list by facility");
    assert_eq!(by_facility.len(), 1);

    assert!(ricelink_db::delete_order(&pool, created.id)
        .await
        .expect("delete order"));
    let recent = ricelink_db::list_recent_orders(&pool, 50)
        .await
        .expect("list recent");
    assert!(recent.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn payment_summary_groups_by_facility(pool: PgPool) {
    let facility = ricelink_db::create_facility(&pool, &new_facility("Lò Sấy Cao Lãnh"))
        .await
        .expect("create facility");

    let first =
        ricelink_db::create_order(&pool, &new_order("Khách 1", facility.id, &facility.name))
            .await
            .expect("create order");
    ricelink_db::create_order(&pool, &new_order("Khách 2", facility.id, &facility.name))
        .await
        .expect("create order");
    ricelink_db::update_payment_status(&pool, first.id, PaymentStatus::Paid)
        .await
        .expect("mark paid")
        .expect("order exists");

    let summary = ricelink_db::payment_summary(&pool).await.expect("summary");
    assert_eq!(summary.len(), 1);
    let row = &summary[0];
    assert_eq!(row.facility_id, facility.id);
    assert_eq!(row.total_orders, 2);
    assert_eq!(row.paid_orders, 1);
    assert_eq!(row.unpaid_orders, 1);
    // 85 000 VND/ton × 20 tons per order.
    assert_eq!(row.paid_amount, Decimal::new(1_700_000, 0));
    assert_eq!(row.unpaid_amount, Decimal::new(1_700_000, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn shipping_company_crud(pool: PgPool) {
    let input = NewShippingCompany {
        name: "Công Ty Cổ Phần Vận Tải BMC Đồng Tháp".to_owned(),
        address: "Số 145, Trương Hán Siêu, Phường Mỹ Trà, Đồng Tháp".to_owned(),
        image_url: Some("/dongthap.png".to_owned()),
        price_per_km: Decimal::new(120_000, 0),
    };

    let created = ricelink_db::create_shipping_company(&pool, &input)
        .await
        .expect("create company");
    assert_eq!(created.price_per_km, Decimal::new(120_000, 0));

    let fetched = ricelink_db::get_shipping_company(&pool, created.id)
        .await
        .expect("get company")
        .expect("company exists");
    let company = fetched.into_shipping_company();
    assert_eq!(company.name, input.name);

    let mut changes = input.clone();
    changes.price_per_km = Decimal::new(150_000, 0);
    let updated = ricelink_db::update_shipping_company(&pool, created.id, &changes)
        .await
        .expect("update company")
        .expect("company exists");
    assert_eq!(updated.price_per_km, Decimal::new(150_000, 0));

    assert!(ricelink_db::delete_shipping_company(&pool, created.id)
        .await
        .expect("delete company"));
    assert!(ricelink_db::list_shipping_companies(&pool)
        .await
        .expect("list companies")
        .is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn account_registration_and_login(pool: PgPool) {
    let salt = "test-salt";
    let hash = ricelink_db::accounts::hash_password(salt, "mật-khẩu");
    let created =
        ricelink_db::create_account(&pool, "Nông Dân", "farmer@example.com", Role::Farmer, &hash)
            .await
            .expect("create account");
    assert_eq!(created.role, "farmer");

    let account = created.into_account().expect("row parses");
    assert_eq!(account.role, Role::Farmer);

    let ok = ricelink_db::verify_credentials(&pool, salt, "farmer@example.com", "mật-khẩu")
        .await
        .expect("verify");
    assert!(ok.is_some(), "correct password should verify");

    let bad = ricelink_db::verify_credentials(&pool, salt, "farmer@example.com", "sai")
        .await
        .expect("verify");
    assert!(bad.is_none(), "wrong password must not verify");

    let unknown = ricelink_db::verify_credentials(&pool, salt, "nobody@example.com", "x")
        .await
        .expect("verify");
    assert!(unknown.is_none());

    let duplicate =
        ricelink_db::create_account(&pool, "Khác", "farmer@example.com", Role::Farmer, &hash)
            .await;
    assert!(duplicate.is_err(), "duplicate email must violate unique");
}

#[sqlx::test(migrations = "../../migrations")]
async fn chat_messages_append_and_list_in_order(pool: PgPool) {
    let facility = ricelink_db::create_facility(&pool, &new_facility("Lò Sấy Hồng Ngự"))
        .await
        .expect("create facility");
    let order =
        ricelink_db::create_order(&pool, &new_order("Khách Chat", facility.id, &facility.name))
            .await
            .expect("create order");

    ricelink_db::append_chat_message(&pool, order.id, "client", "Lò còn nhận lúa không?")
        .await
        .expect("append");
    ricelink_db::append_chat_message(&pool, order.id, "shop", "Còn nhé, mai mang tới.")
        .await
        .expect("append");

    let messages = ricelink_db::list_chat_messages(&pool, order.id)
        .await
        .expect("list");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, "client");
    assert_eq!(messages[1].sender, "shop");

    let orphan = ricelink_db::append_chat_message(&pool, Uuid::new_v4(), "client", "?").await;
    assert!(orphan.is_err(), "unknown order must violate the foreign key");
}
