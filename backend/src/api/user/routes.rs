//! Defines the HTTP routes for user profile and management.
//!
//! These routes provide endpoints for accessing and updating user-specific
//! data beyond authentication credentials.

use super::handlers::{change_password, get_me, list_users, revoke_all, set_role, update_me};
use crate::auth::handlers::register;
use crate::auth::middleware::{admin_auth, jwt_auth};
use axum::{
    Router, middleware,
    routing::{MethodRouter, get, post},
};

pub fn user_router() -> Router {
    let admin_listing: MethodRouter = get(list_users)
        .layer(middleware::from_fn(admin_auth))
        .layer(middleware::from_fn(jwt_auth));
    let listing = admin_listing.post(register);

    Router::new()
        .route("/users", listing.clone())
        .route("/users/", listing)
        .route(
            "/users/me",
            get(get_me)
                .patch(update_me)
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/users/me/change-password",
            post(change_password).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/users/{username}/role",
            post(set_role)
                .layer(middleware::from_fn(admin_auth))
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/users/{username}/revoke_all",
            post(revoke_all)
                .layer(middleware::from_fn(admin_auth))
                .layer(middleware::from_fn(jwt_auth)),
        )
}
