//! Business logic layer sitting between the HTTP handlers and the repositories.

pub mod calculation_service;
pub mod evaluator;
pub mod user_service;
