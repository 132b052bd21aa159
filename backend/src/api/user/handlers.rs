//! Handler functions for user profile and management API endpoints.
//!
//! Self-service endpoints operate on the `User` resolved by the bearer gate;
//! the role and bulk-revoke endpoints are admin only.

use crate::api::common::{ApiResponse, HttpError, service_error_to_http};
use crate::auth::models::{RevokeAllResponse, UserInfo};
use crate::auth::service::AuthService;
use crate::database::models::{
    ChangePasswordRequest, ListQuery, RoleUpdateRequest, UpdateProfileRequest, User,
};
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use axum::{
    extract::{Extension, Json, Path, Query},
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Returns the caller's own profile.
#[axum::debug_handler]
pub async fn get_me(Extension(user): Extension<User>) -> ResponseJson<ApiResponse<UserInfo>> {
    ResponseJson(ApiResponse::success(
        UserInfo::from(user),
        "User retrieved successfully",
    ))
}

#[axum::debug_handler]
pub async fn update_me(
    Extension(pool): Extension<SqlitePool>,
    Extension(hasher): Extension<PasswordHasher>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, HttpError> {
    let user_service = UserService::new(&pool, hasher);

    match user_service.update_profile(&user, payload).await {
        Ok(updated) => Ok(ResponseJson(ApiResponse::success(
            UserInfo::from(updated),
            "Profile updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn change_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(hasher): Extension<PasswordHasher>,
    Extension(user): Extension<User>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, HttpError> {
    let user_service = UserService::new(&pool, hasher);

    match user_service.change_password(&user, payload).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            (),
            "Password changed successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Lists all users (admin).
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
    Extension(hasher): Extension<PasswordHasher>,
    Query(query): Query<ListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<UserInfo>>>, HttpError> {
    let user_service = UserService::new(&pool, hasher);

    match user_service.list_users(&query).await {
        Ok(users) => Ok(ResponseJson(ApiResponse::ok(
            users.into_iter().map(UserInfo::from).collect(),
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Sets a user's role (admin).
#[axum::debug_handler]
pub async fn set_role(
    Extension(pool): Extension<SqlitePool>,
    Extension(hasher): Extension<PasswordHasher>,
    Extension(admin): Extension<User>,
    Path(username): Path<String>,
    Json(payload): Json<RoleUpdateRequest>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, HttpError> {
    tracing::info!("Admin {} setting role of {}", admin.username, username);

    let user_service = UserService::new(&pool, hasher);

    match user_service.set_role(&username, payload).await {
        Ok(updated) => Ok(ResponseJson(ApiResponse::success(
            UserInfo::from(updated),
            "Role updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Revokes every refresh token of a user (admin).
#[axum::debug_handler]
pub async fn revoke_all(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<JwtUtils>,
    Extension(hasher): Extension<PasswordHasher>,
    Path(username): Path<String>,
) -> Result<ResponseJson<ApiResponse<RevokeAllResponse>>, HttpError> {
    let auth_service = AuthService::new(&pool, &jwt_utils, hasher);

    match auth_service.revoke_all_for_username(&username).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "All refresh tokens revoked",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
