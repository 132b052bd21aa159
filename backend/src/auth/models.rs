//! Data structures for authentication-related entities.
//!
//! Request and response payloads for login, token refresh and revocation,
//! plus the public view of a user returned by the API.

use crate::database::models::{RefreshToken, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token type reported to clients alongside every access token.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Login request payload. Exactly one of `username` or `email` is expected;
/// `username` wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Body of the refresh, logout and admin revoke endpoints.
///
/// The token is optional at the type level so a missing field is reported
/// as a 400 by the service rather than a 422 by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Tokens handed out by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Ledger row as shown to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenInfo {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<RefreshToken> for RefreshTokenInfo {
    fn from(token: RefreshToken) -> Self {
        Self {
            id: token.id,
            user_id: token.user_id,
            token: token.token,
            revoked: token.revoked,
            created_at: token.created_at,
            expires_at: token.expires_at,
        }
    }
}

/// Result of a bulk revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokeAllResponse {
    pub username: String,
    pub revoked: u64,
}
