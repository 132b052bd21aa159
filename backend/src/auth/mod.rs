//! Authentication module for managing user sessions and access control.
//!
//! This module provides the public interface for login, registration,
//! refresh-token management and the authorization middleware.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
