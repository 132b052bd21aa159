//! System-wide token and user introspection for administrators.

pub mod handlers;
pub mod routes;
