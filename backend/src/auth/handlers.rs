//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for registration, login,
//! token refresh and revocation, and delegate to `auth::service` for the
//! core business logic.

use crate::api::common::{ApiResponse, HttpError, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::database::models::{RegisterRequest, User};
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(hasher): Extension<PasswordHasher>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<UserInfo>>), HttpError> {
    let user_service = UserService::new(&pool, hasher);

    match user_service.register(payload).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(
                UserInfo::from(user),
                "User registered successfully",
            )),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<TokenResponse>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ResponseJson<TokenResponse>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.refresh_token(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Revoke one of the caller's refresh tokens
#[axum::debug_handler]
pub async fn logout(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Extension(user): Extension<User>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.revoke_my_token(&user, payload).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            (),
            "Refresh token revoked",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// List the caller's refresh tokens
#[axum::debug_handler]
pub async fn list_my_tokens(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<Vec<RefreshTokenInfo>>>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.list_my_tokens(&user).await {
        Ok(tokens) => Ok(ResponseJson(ApiResponse::ok(
            tokens.into_iter().map(RefreshTokenInfo::from).collect(),
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn revoke_my_token_by_id(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.revoke_my_token_by_id(&user, id).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            (),
            "Refresh token revoked",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
