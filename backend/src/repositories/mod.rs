//! Data access layer, one repository per table.

pub mod calculation_repository;
pub mod refresh_token_repository;
pub mod user_repository;

/// Returns true when `error` wraps a UNIQUE constraint failure from SQLite.
pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}
