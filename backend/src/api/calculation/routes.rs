//! Routes for calculation records (bearer, owner-scoped) and the public
//! arithmetic endpoints.

use super::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::get};

pub fn calculation_router() -> Router {
    Router::new()
        .route("/calculations", get(browse).post(add))
        .route(
            "/calculations/{id}",
            get(read).put(replace).patch(edit).delete(remove),
        )
        .route_layer(middleware::from_fn(jwt_auth))
}

pub fn arithmetic_router() -> Router {
    Router::new()
        .route("/add", get(add_numbers))
        .route("/subtract", get(subtract_numbers))
        .route("/multiply", get(multiply_numbers))
        .route("/divide", get(divide_numbers))
}
