//! Database seeding from the facilities YAML file.
//!
//! Mirrors the demo data the marketplace ships with: Đồng Tháp drying
//! facilities, the three shipping companies, and one demo account per
//! role. Listings may omit rating and capacity; those get randomized
//! defaults (3.5–5.0 stars, 500–2000 tons) like the original seed data.

use anyhow::Context;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use ricelink_core::{AppConfig, Role};
use ricelink_db::{facilities::NewFacility, shipping::NewShippingCompany};

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    facilities: Vec<SeedFacility>,
    #[serde(default)]
    shipping_companies: Vec<SeedShippingCompany>,
}

#[derive(Debug, Deserialize)]
struct SeedFacility {
    name: String,
    district: String,
    address: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    capacity_tons: Option<i64>,
    drying_price: Decimal,
    drying_and_storage_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct SeedShippingCompany {
    name: String,
    address: String,
    #[serde(default)]
    image_url: Option<String>,
    price_per_km: Decimal,
}

struct DemoAccount {
    name: &'static str,
    email: &'static str,
    role: Role,
    password: &'static str,
}

const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        name: "Admin",
        email: "admin@example.com",
        role: Role::Admin,
        password: "admin123",
    },
    DemoAccount {
        name: "Farmer Demo",
        email: "farmer@example.com",
        role: Role::Farmer,
        password: "farmer123",
    },
    DemoAccount {
        name: "Shop Owner",
        email: "shop@example.com",
        role: Role::Shop,
        password: "shop123",
    },
];

fn into_new_facility(seed: SeedFacility) -> NewFacility {
    let mut rng = rand::rng();
    let rating = seed
        .rating
        .unwrap_or_else(|| (rng.random_range(3.5f64..=5.0) * 10.0).round() / 10.0);
    let capacity_tons = seed
        .capacity_tons
        .unwrap_or_else(|| rng.random_range(500..=2_000));

    NewFacility {
        name: seed.name,
        district: seed.district,
        address: seed.address,
        latitude: seed.latitude,
        longitude: seed.longitude,
        rating,
        capacity_tons,
        drying_price: seed.drying_price,
        drying_and_storage_price: seed.drying_and_storage_price,
    }
}

pub async fn run(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&config.facilities_path).with_context(|| {
        format!(
            "reading seed file {}",
            config.facilities_path.display()
        )
    })?;
    let seed: SeedFile = serde_yaml::from_str(&raw).context("parsing seed file")?;

    if dry_run {
        println!(
            "dry-run: would seed {} facilities, {} shipping companies, {} demo accounts",
            seed.facilities.len(),
            seed.shipping_companies.len(),
            DEMO_ACCOUNTS.len()
        );
        for facility in &seed.facilities {
            println!("  {} — {}", facility.name, facility.district);
        }
        return Ok(());
    }

    let pool_config = ricelink_db::PoolConfig::from_app_config(config);
    let pool = ricelink_db::connect_pool(&config.database_url, pool_config).await?;
    ricelink_db::run_migrations(&pool).await?;

    seed_facilities(&pool, seed.facilities).await?;
    seed_shipping(&pool, seed.shipping_companies).await?;
    seed_accounts(&pool, &config.password_hash_salt).await?;

    Ok(())
}

async fn seed_facilities(pool: &PgPool, facilities: Vec<SeedFacility>) -> anyhow::Result<()> {
    let existing = ricelink_db::list_facilities(pool).await?;
    if !existing.is_empty() {
        println!(
            "facilities: {} rows already present, skipping",
            existing.len()
        );
        return Ok(());
    }

    let count = facilities.len();
    for seed in facilities {
        let input = into_new_facility(seed);
        let row = ricelink_db::create_facility(pool, &input).await?;
        println!(
            "  + {} ({} tấn/ngày, {}★)",
            row.name, row.capacity_tons, row.rating
        );
    }
    println!("facilities: seeded {count}");
    Ok(())
}

async fn seed_shipping(
    pool: &PgPool,
    companies: Vec<SeedShippingCompany>,
) -> anyhow::Result<()> {
    let existing = ricelink_db::list_shipping_companies(pool).await?;
    if !existing.is_empty() {
        println!(
            "shipping companies: {} rows already present, skipping",
            existing.len()
        );
        return Ok(());
    }

    let count = companies.len();
    for company in companies {
        let input = NewShippingCompany {
            name: company.name,
            address: company.address,
            image_url: company.image_url,
            price_per_km: company.price_per_km,
        };
        let row = ricelink_db::create_shipping_company(pool, &input).await?;
        println!("  + {} ({} VND/km)", row.name, row.price_per_km);
    }
    println!("shipping companies: seeded {count}");
    Ok(())
}

async fn seed_accounts(pool: &PgPool, salt: &str) -> anyhow::Result<()> {
    let mut created = 0usize;
    for account in DEMO_ACCOUNTS {
        if ricelink_db::find_account_by_email(pool, account.email)
            .await?
            .is_some()
        {
            continue;
        }
        let digest = ricelink_db::accounts::hash_password(salt, account.password);
        ricelink_db::create_account(pool, account.name, account.email, account.role, &digest)
            .await?;
        created += 1;
    }
    println!("demo accounts: created {created}");
    Ok(())
}
