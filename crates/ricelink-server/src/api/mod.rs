mod accounts;
mod chatbot;
mod facilities;
mod matching;
mod orders;
mod shipping;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use ricelink_core::AppConfig;
use ricelink_vietmap::VietmapClient;

use crate::feed::FacilityFeed;
use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    /// `None` when no VietMap API key is configured; the matching endpoint
    /// reports itself unavailable in that case.
    pub vietmap: Option<Arc<VietmapClient>>,
    pub feed: FacilityFeed,
    /// Shared client for the chatbot proxy.
    pub http: reqwest::Client,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "address_not_found" => StatusCode::UNPROCESSABLE_ENTITY,
            "no_routes_found" | "upstream_error" => StatusCode::BAD_GATEWAY,
            "not_configured" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &ricelink_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/matching/search", post(matching::search))
        .route("/api/v1/facilities", get(facilities::list_facilities))
        .route(
            "/api/v1/facilities/version",
            get(facilities::facility_version),
        )
        .route("/api/v1/facilities/{id}", get(facilities::get_facility))
        .route(
            "/api/v1/shipping-companies",
            get(shipping::list_shipping_companies),
        )
        .route("/api/v1/accounts/register", post(accounts::register))
        .route("/api/v1/accounts/login", post(accounts::login))
        .route("/api/v1/chatbot", post(chatbot::converse))
        .route(
            "/api/v1/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route(
            "/api/v1/orders/{id}/messages",
            get(orders::list_messages).post(orders::append_message),
        )
}

/// Admin routes live under `/api/v1/admin` and sit behind bearer auth and
/// the rate limiter; the storefront routes above stay public.
fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/facilities", post(facilities::create_facility))
        .route(
            "/api/v1/admin/facilities/{id}",
            put(facilities::update_facility).delete(facilities::delete_facility),
        )
        .route(
            "/api/v1/admin/shipping-companies",
            post(shipping::create_shipping_company),
        )
        .route(
            "/api/v1/admin/shipping-companies/{id}",
            put(shipping::update_shipping_company).delete(shipping::delete_shipping_company),
        )
        .route("/api/v1/admin/orders", get(orders::list_recent_orders))
        .route(
            "/api/v1/admin/orders/{id}/status",
            patch(orders::update_order_status),
        )
        .route(
            "/api/v1/admin/orders/{id}/payment",
            patch(orders::update_payment_status),
        )
        .route(
            "/api/v1/admin/orders/{id}",
            axum::routing::delete(orders::delete_order),
        )
        .route("/api/v1/admin/payments/summary", get(orders::payment_summary))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .merge(public_router())
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match ricelink_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Arc;

    use ricelink_core::{AppConfig, Environment};

    use super::AppState;
    use crate::feed::FacilityFeed;

    pub(crate) fn dev_config() -> AppConfig {
        AppConfig {
            database_url: String::new(),
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse::<SocketAddr>().expect("addr"),
            log_level: "info".to_owned(),
            facilities_path: PathBuf::from("./config/facilities.yaml"),
            password_hash_salt: "test-salt".to_owned(),
            vietmap_api_key: None,
            vietmap_base_url: "https://maps.vietmap.vn".to_owned(),
            vietmap_timeout_secs: 10,
            route_max_concurrent: 4,
            chatbot_endpoint: None,
            chatbot_timeout_secs: 5,
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
        }
    }

    pub(crate) fn app_state(pool: sqlx::PgPool) -> AppState {
        AppState {
            pool,
            config: Arc::new(dev_config()),
            vietmap: None,
            feed: FacilityFeed::new(),
            http: reqwest::Client::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_codes_map_to_expected_statuses() {
        let cases = [
            ("validation_error", StatusCode::BAD_REQUEST),
            ("address_not_found", StatusCode::UNPROCESSABLE_ENTITY),
            ("no_routes_found", StatusCode::BAD_GATEWAY),
            ("upstream_error", StatusCode::BAD_GATEWAY),
            ("not_configured", StatusCode::SERVICE_UNAVAILABLE),
            ("not_found", StatusCode::NOT_FOUND),
            ("conflict", StatusCode::CONFLICT),
            ("anything_else", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            let response = ApiError::new("req-1", code, "msg").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    async fn seed_facility(pool: &sqlx::PgPool, name: &str) -> uuid::Uuid {
        sqlx::query_scalar::<_, uuid::Uuid>(
            "INSERT INTO facilities \
                 (name, district, address, latitude, longitude, rating, capacity_tons, \
                  drying_price, drying_and_storage_price) \
             VALUES ($1, 'Cao Lãnh', 'Đồng Tháp', 10.46, 105.63, 4.2, 800, 85000, 110000) \
             RETURNING id",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed facility")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_facilities_returns_seeded_rows(pool: sqlx::PgPool) {
        seed_facility(&pool, "Lò Sấy Một").await;

        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(test_support::app_state(pool), auth, default_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/facilities")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"].as_str(), Some("Lò Sấy Một"));
        assert_eq!(data[0]["capacity_tons"].as_i64(), Some(800));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_facility_returns_404_for_unknown_id(pool: sqlx::PgPool) {
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(test_support::app_state(pool), auth, default_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/facilities/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_without_vietmap_key_is_unavailable(pool: sqlx::PgPool) {
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(test_support::app_state(pool), auth, default_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/matching/search")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "address": "Cao Lãnh", "requested_capacity": 10 })
                            .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn facility_version_starts_at_zero(pool: sqlx::PgPool) {
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let app = build_app(test_support::app_state(pool), auth, default_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/facilities/version")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["version"].as_u64(), Some(0));
    }
}
