//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle registration, login, token refreshing and
//! revocation of the caller's own refresh tokens.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/refresh", post(refresh_token))
        .route(
            "/users/logout",
            post(logout).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/users/me/revoke",
            post(logout).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/users/me/tokens",
            get(list_my_tokens).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/users/me/tokens/{id}",
            delete(revoke_my_token_by_id).layer(middleware::from_fn(jwt_auth)),
        )
}
