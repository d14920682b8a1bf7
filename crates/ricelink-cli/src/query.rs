//! Debug subcommands driving the geocoder and the matching engine from the
//! terminal.

use anyhow::Context;

use ricelink_core::AppConfig;
use ricelink_vietmap::VietmapClient;

fn vietmap_client(config: &AppConfig) -> anyhow::Result<VietmapClient> {
    let key = config
        .vietmap_api_key
        .as_deref()
        .context("VIETMAP_API_KEY is not set")?;
    VietmapClient::with_base_url(key, config.vietmap_timeout_secs, &config.vietmap_base_url)
        .context("building VietMap client")
}

pub async fn geocode(config: &AppConfig, address: &str) -> anyhow::Result<()> {
    let client = vietmap_client(config)?;

    match client.geocode(address).await? {
        Some(point) => println!("{address} -> lat {}, lon {}", point.lat, point.lon),
        None => println!("{address} -> không tìm thấy"),
    }
    Ok(())
}

pub async fn run_match(config: &AppConfig, address: &str, capacity: f64) -> anyhow::Result<()> {
    let client = vietmap_client(config)?;

    let pool_config = ricelink_db::PoolConfig::from_app_config(config);
    let pool = ricelink_db::connect_pool(&config.database_url, pool_config).await?;
    let facilities: Vec<_> = ricelink_db::list_facilities(&pool)
        .await?
        .into_iter()
        .map(ricelink_db::FacilityRow::into_facility)
        .collect();

    let outcome = ricelink_matching::find_matches(
        &client,
        address,
        capacity,
        &facilities,
        config.route_max_concurrent,
    )
    .await?;

    println!(
        "{} routed, best: {} ({:.1} km)",
        outcome.routes.len(),
        outcome.best_route.facility.name,
        outcome.best_route.distance_m / 1_000.0
    );
    for (index, candidate) in outcome.ranked.iter().enumerate() {
        println!(
            "  {:>2}. {:<40} {:>7.1} km  {:.1}★  {:>5} tấn  {} VND/tấn",
            index + 1,
            candidate.name,
            candidate.distance_m / 1_000.0,
            candidate.rating,
            candidate.capacity_tons,
            candidate.drying_price
        );
    }
    Ok(())
}
