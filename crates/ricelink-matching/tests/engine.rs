//! End-to-end tests for the matching engine against wiremock VietMap stubs.

use rust_decimal::Decimal;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ricelink_core::{Facility, GeoPoint};
use ricelink_matching::{find_matches, MatchError};
use ricelink_vietmap::VietmapClient;

// Single-point encoded polyline; content is irrelevant to ranking.
const ENCODED_STUB: &str = "_p~iF~ps|U";

fn test_client(base_url: &str) -> VietmapClient {
    VietmapClient::with_base_url("test-key", 10, base_url)
        .expect("client construction should not fail")
}

fn facility(name: &str, lat: f64, lon: f64, rating: f64, capacity_tons: i64) -> Facility {
    Facility {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        district: "Cao Lãnh".to_owned(),
        address: format!("{name}, Đồng Tháp"),
        location: GeoPoint::new(lat, lon),
        rating,
        capacity_tons,
        drying_price: Decimal::new(90_000, 0),
        drying_and_storage_price: Decimal::new(120_000, 0),
    }
}

/// Mounts the geocoding chain resolving any address to (10, 105).
async fn mount_geocode(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/search/v3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "ref_id": "vm:origin", "display": "origin" }
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/place/v3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lat": 10.0, "lng": 105.0
        })))
        .mount(server)
        .await;
}

/// Mounts a route response for requests whose destination point is
/// `facility`'s coordinates.
async fn mount_route(server: &MockServer, facility: &Facility, distance_m: f64) {
    Mock::given(method("GET"))
        .and(path("/api/route"))
        .and(query_param("point", facility.location.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "paths": [ { "distance": distance_m, "points": ENCODED_STUB } ]
        })))
        .mount(server)
        .await;
}

async fn mount_route_failure(server: &MockServer, facility: &Facility) {
    Mock::given(method("GET"))
        .and(path("/api/route"))
        .and(query_param("point", facility.location.to_string()))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn capacity_filter_keeps_only_large_enough_facilities() {
    let server = MockServer::start().await;
    mount_geocode(&server).await;

    let a = facility("A", 10.1, 105.1, 4.0, 500);
    let b = facility("B", 10.2, 105.2, 4.0, 1_000);
    let c = facility("C", 10.3, 105.3, 4.0, 200);
    mount_route(&server, &a, 1_000.0).await;
    mount_route(&server, &b, 2_000.0).await;
    mount_route(&server, &c, 3_000.0).await;

    let client = test_client(&server.uri());
    let outcome = find_matches(
        &client,
        "Xã Thanh Mỹ",
        600.0,
        &[a.clone(), b.clone(), c.clone()],
        4,
    )
    .await
    .expect("search should succeed");

    assert_eq!(outcome.ranked.len(), 1, "only B satisfies 600 tons");
    assert_eq!(outcome.ranked[0].facility_id, b.id);
    assert_eq!(outcome.routes.len(), 3, "all routes are still drawn");
    assert_eq!(
        outcome.best_route.facility.id, a.id,
        "best route ignores the capacity filter"
    );
}

#[tokio::test]
async fn zero_capacity_disables_the_filter() {
    let server = MockServer::start().await;
    mount_geocode(&server).await;

    let a = facility("A", 10.1, 105.1, 4.0, 500);
    let b = facility("B", 10.2, 105.2, 4.0, 200);
    mount_route(&server, &a, 1_000.0).await;
    mount_route(&server, &b, 2_000.0).await;

    let client = test_client(&server.uri());
    let outcome = find_matches(&client, "Xã Thanh Mỹ", 0.0, &[a, b], 4)
        .await
        .expect("search should succeed");

    assert_eq!(outcome.ranked.len(), 2);
}

#[tokio::test]
async fn equal_distances_rank_by_rating_descending() {
    let server = MockServer::start().await;
    mount_geocode(&server).await;

    let a = facility("A", 10.1, 105.1, 4.0, 500);
    let b = facility("B", 10.2, 105.2, 4.5, 500);
    mount_route(&server, &a, 5_000.0).await;
    mount_route(&server, &b, 5_000.0).await;

    let client = test_client(&server.uri());
    let outcome = find_matches(&client, "Xã Thanh Mỹ", 100.0, &[a.clone(), b.clone()], 4)
        .await
        .expect("search should succeed");

    let order: Vec<Uuid> = outcome.ranked.iter().map(|c| c.facility_id).collect();
    assert_eq!(order, vec![b.id, a.id], "higher rating wins the tie");
}

#[tokio::test]
async fn failed_routes_are_dropped_without_failing_the_search() {
    let server = MockServer::start().await;
    mount_geocode(&server).await;

    let ok_one = facility("ok-one", 10.1, 105.1, 4.0, 500);
    let broken = facility("broken", 10.2, 105.2, 4.0, 500);
    let ok_two = facility("ok-two", 10.3, 105.3, 4.0, 500);
    mount_route(&server, &ok_one, 4_000.0).await;
    mount_route_failure(&server, &broken).await;
    mount_route(&server, &ok_two, 2_000.0).await;

    let client = test_client(&server.uri());
    let outcome = find_matches(
        &client,
        "Xã Thanh Mỹ",
        0.0,
        &[ok_one.clone(), broken.clone(), ok_two.clone()],
        4,
    )
    .await
    .expect("one broken route must not abort the search");

    assert_eq!(outcome.ranked.len(), 2);
    assert!(outcome.ranked.iter().all(|c| c.facility_id != broken.id));
    assert_eq!(outcome.best_route.facility.id, ok_two.id);
}

#[tokio::test]
async fn unparseable_path_counts_as_failed_route() {
    let server = MockServer::start().await;
    mount_geocode(&server).await;

    let good = facility("good", 10.1, 105.1, 4.0, 500);
    let garbled = facility("garbled", 10.2, 105.2, 4.0, 500);
    mount_route(&server, &good, 4_000.0).await;
    Mock::given(method("GET"))
        .and(path("/api/route"))
        .and(query_param("point", garbled.location.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "paths": [ { "distance": 100.0, "points": { "not": "a string" } } ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let outcome = find_matches(&client, "Xã Thanh Mỹ", 0.0, &[good.clone(), garbled], 4)
        .await
        .expect("unparseable path must not abort the search");

    assert_eq!(outcome.ranked.len(), 1);
    assert_eq!(outcome.ranked[0].facility_id, good.id);
}

#[tokio::test]
async fn all_routes_failing_is_no_routes_found() {
    let server = MockServer::start().await;
    mount_geocode(&server).await;

    let a = facility("A", 10.1, 105.1, 4.0, 500);
    let b = facility("B", 10.2, 105.2, 4.0, 500);
    mount_route_failure(&server, &a).await;
    mount_route_failure(&server, &b).await;

    let client = test_client(&server.uri());
    let result = find_matches(&client, "Xã Thanh Mỹ", 0.0, &[a, b], 4).await;

    assert!(matches!(result, Err(MatchError::NoRoutesFound)));
}

#[tokio::test]
async fn unresolvable_address_is_address_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/v3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let a = facility("A", 10.1, 105.1, 4.0, 500);
    let client = test_client(&server.uri());
    let result = find_matches(&client, "nơi nào đó", 0.0, &[a], 4).await;

    match result {
        Err(MatchError::AddressNotFound(address)) => assert_eq!(address, "nơi nào đó"),
        other => panic!("expected AddressNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn identical_inputs_yield_identical_rankings() {
    let server = MockServer::start().await;
    mount_geocode(&server).await;

    let facilities: Vec<Facility> = (1..=6)
        .map(|i| {
            let offset = f64::from(i) / 10.0;
            facility(&format!("F{i}"), 10.0 + offset, 105.0 + offset, 4.0, 500)
        })
        .collect();
    for f in &facilities {
        // Several equal distances so tie-breaks are exercised.
        mount_route(&server, f, 5_000.0).await;
    }

    let client = test_client(&server.uri());
    let first = find_matches(&client, "Xã Thanh Mỹ", 0.0, &facilities, 3)
        .await
        .expect("search should succeed");
    let second = find_matches(&client, "Xã Thanh Mỹ", 0.0, &facilities, 3)
        .await
        .expect("search should succeed");

    assert_eq!(first.ranked, second.ranked);
    assert_eq!(
        first.best_route.facility.id,
        second.best_route.facility.id
    );
}
