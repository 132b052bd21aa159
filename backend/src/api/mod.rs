//! Central module for organizing the application's API endpoints.
//!
//! Each domain contributes its own router; `app_router` merges them and
//! installs the shared state every handler and middleware reads.

pub mod admin;
pub mod calculation;
pub mod common;
pub mod user;


use crate::auth;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use axum::{Extension, Router, response::Json, routing::get};
use common::ApiResponse;
use sqlx::SqlitePool;

/// Builds the complete application router.
pub fn app_router(pool: SqlitePool, jwt_utils: JwtUtils, hasher: PasswordHasher) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .merge(auth::routes::auth_router())
        .merge(user::routes::user_router())
        .nest("/admin", admin::routes::admin_router())
        .merge(calculation::routes::calculation_router())
        .merge(calculation::routes::arithmetic_router())
        .layer(Extension(pool))
        .layer(Extension(jwt_utils))
        .layer(Extension(hasher))
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Calculator Backend",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the Calculator API",
    ))
}
