//! Admin-only routes. Every route sits behind `jwt_auth` and `admin_auth`.

use super::handlers::{list_all_tokens, list_user_tokens, list_users, revoke_token};
use crate::auth::middleware::{admin_auth, jwt_auth};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn admin_router() -> Router {
    Router::new()
        .route("/tokens", get(list_all_tokens))
        .route("/tokens/revoke", post(revoke_token))
        .route("/users", get(list_users))
        .route("/users/{username}/tokens", get(list_user_tokens))
        .route_layer(middleware::from_fn(admin_auth))
        .route_layer(middleware::from_fn(jwt_auth))
}
