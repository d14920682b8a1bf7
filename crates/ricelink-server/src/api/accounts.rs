//! Customer/operator account handlers: registration and login.
//!
//! Sessions are the frontend's concern; these endpoints only validate
//! credentials and return the account record.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use ricelink_core::{Account, Role};
use ricelink_db::accounts::hash_password;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn map_unique_violation(req_id: &str, e: &ricelink_db::DbError) -> ApiError {
    if let ricelink_db::DbError::Sqlx(sqlx::Error::Database(db_err)) = e {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::new(req_id, "conflict", "Email đã được đăng ký.");
        }
    }
    map_db_error(req_id.to_owned(), e)
}

/// POST /api/v1/accounts/register
pub(super) async fn register(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    let rid = req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.len() > 200 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "Vui lòng nhập họ tên (tối đa 200 ký tự).",
        ));
    }
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "Email không hợp lệ.",
        ));
    }
    if body.password.len() < 6 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "Mật khẩu phải có ít nhất 6 ký tự.",
        ));
    }

    let digest = hash_password(&state.config.password_hash_salt, &body.password);
    let row = ricelink_db::create_account(&state.pool, name, &email, body.role, &digest)
        .await
        .map_err(|e| map_unique_violation(&rid, &e))?;
    let account = row
        .into_account()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: account,
            meta: ResponseMeta::new(rid),
        }),
    ))
}

/// POST /api/v1/accounts/login
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let rid = req_id.0;
    let email = body.email.trim().to_lowercase();

    let row = ricelink_db::verify_credentials(
        &state.pool,
        &state.config.password_hash_salt,
        &email,
        &body.password,
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    let Some(row) = row else {
        return Err(ApiError::new(
            rid,
            "unauthorized",
            "Email hoặc mật khẩu không đúng.",
        ));
    };
    let account = row
        .into_account()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: account,
        meta: ResponseMeta::new(rid),
    }))
}
