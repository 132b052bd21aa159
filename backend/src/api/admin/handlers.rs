//! Handler functions for the system-wide admin endpoints.

use crate::api::common::{ApiResponse, HttpError, service_error_to_http};
use crate::auth::models::{RefreshTokenInfo, RefreshTokenRequest};
use crate::auth::service::AuthService;
use crate::database::models::{ListQuery, User, UserWithTokenCount};
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use axum::{
    extract::{Extension, Json, Path, Query},
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

fn token_views(tokens: Vec<crate::database::models::RefreshToken>) -> Vec<RefreshTokenInfo> {
    tokens.into_iter().map(RefreshTokenInfo::from).collect()
}

/// Lists every row of the refresh-token ledger.
#[axum::debug_handler]
pub async fn list_all_tokens(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
) -> Result<ResponseJson<ApiResponse<Vec<RefreshTokenInfo>>>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.list_all_tokens().await {
        Ok(tokens) => Ok(ResponseJson(ApiResponse::ok(token_views(tokens)))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn list_user_tokens(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Path(username): Path<String>,
) -> Result<ResponseJson<ApiResponse<Vec<RefreshTokenInfo>>>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.list_tokens_for_username(&username).await {
        Ok(tokens) => Ok(ResponseJson(ApiResponse::ok(token_views(tokens)))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Revokes any refresh token by its string value.
#[axum::debug_handler]
pub async fn revoke_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Extension(admin): Extension<User>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.admin_revoke_token(payload).await {
        Ok(()) => {
            tracing::info!("Token revoked by admin {}", admin.username);
            Ok(ResponseJson(ApiResponse::success((), "Refresh token revoked")))
        }
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Lists users together with how many refresh tokens each one holds.
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
    Extension(hasher): Extension<PasswordHasher>,
    Query(query): Query<ListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<UserWithTokenCount>>>, HttpError> {
    let user_service = UserService::new(&pool, hasher);

    match user_service.list_users_with_token_counts(&query).await {
        Ok(users) => Ok(ResponseJson(ApiResponse::ok(users))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
