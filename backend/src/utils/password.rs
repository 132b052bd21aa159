//! Password hashing backed by bcrypt.
//!
//! Hashing and verification are CPU-bound, so both run on the blocking
//! thread pool instead of the async executor.

use bcrypt::{hash, verify};

use crate::errors::{ServiceError, ServiceResult};

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `password` with a fresh salt.
    ///
    /// Passwords longer than `MAX_PASSWORD_BYTES` are refused rather than
    /// silently truncated.
    pub async fn hash(&self, password: &str) -> ServiceResult<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(ServiceError::validation(format!(
                "password: Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| ServiceError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
    }

    /// Verifies `password` against a stored hash.
    ///
    /// A malformed hash or an over-length password counts as a mismatch.
    pub async fn verify(&self, password: &str, password_hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        let password = password.to_string();
        let password_hash = password_hash.to_string();

        match tokio::task::spawn_blocking(move || verify(password, &password_hash)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                tracing::warn!("Password verification failed: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }
}
