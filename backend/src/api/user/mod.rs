//! Module for user profile and user management API endpoints.

pub mod handlers;
pub mod routes;
