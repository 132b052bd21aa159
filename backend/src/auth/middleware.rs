//! Middleware for protecting authenticated routes and handling authorization.
//!
//! `jwt_auth` resolves the bearer token to a `User` and stores it in the
//! request extensions; `admin_auth` must be layered inside it.

use crate::api::common::{HttpError, error_response, service_error_to_http};
use crate::auth::service::AuthService;
use crate::database::models::{ADMIN_ROLE, User};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use axum::{
    extract::Request,
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn missing_state() -> HttpError {
    tracing::error!("Authentication middleware is missing shared state");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        "internal_error",
    )
}

/// JWT authentication middleware
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, HttpError> {
    let token = bearer_token(&request)
        .ok_or_else(|| {
            error_response(
                StatusCode::UNAUTHORIZED,
                "Not authenticated",
                "unauthenticated",
            )
        })?
        .to_string();

    let extensions = request.extensions();
    let pool = extensions
        .get::<SqlitePool>()
        .cloned()
        .ok_or_else(missing_state)?;
    let jwt_utils = extensions
        .get::<JwtUtils>()
        .cloned()
        .ok_or_else(missing_state)?;
    let hasher = extensions
        .get::<PasswordHasher>()
        .copied()
        .ok_or_else(missing_state)?;

    let user = AuthService::new(&pool, &jwt_utils, hasher)
        .resolve_bearer(&token)
        .await
        .map_err(service_error_to_http)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Checks the user resolved by `jwt_auth` against `role` by string equality.
pub fn require_role(request: &Request, role: &str) -> Result<(), HttpError> {
    let user = request.extensions().get::<User>().ok_or_else(|| {
        error_response(
            StatusCode::UNAUTHORIZED,
            "Not authenticated",
            "unauthenticated",
        )
    })?;

    if !user.has_role(role) {
        tracing::warn!("User {} lacks role {}", user.username, role);
        return Err(error_response(
            StatusCode::FORBIDDEN,
            format!("Requires role '{}'", role),
            "permission_denied",
        ));
    }

    Ok(())
}

/// Admin role authorization middleware
pub async fn admin_auth(request: Request, next: Next) -> Result<Response, HttpError> {
    require_role(&request, ADMIN_ROLE)?;
    Ok(next.run(request).await)
}
