//! Calculation BREAD endpoints and the query-string arithmetic helpers.

pub mod handlers;
pub mod routes;
