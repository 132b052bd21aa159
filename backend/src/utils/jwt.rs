//! JWT token utilities for authentication and authorization.
//!
//! Provides token creation, validation, and claims management for access and
//! refresh tokens. Both kinds are HS256-signed with the same process-wide
//! secret; refresh tokens additionally carry `typ = "refresh"` and a unique
//! `jti`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ServiceError;

/// Type tag carried by refresh tokens only.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Upper bound for either token lifetime (ten years).
pub const MAX_TOKEN_LIFETIME_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Username of the token owner
    pub sub: String,
    /// Token issued at timestamp
    pub iat: usize,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token type, `Some("refresh")` for refresh tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Unique token id (refresh tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// An encoded token together with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT token utility for creating and validating tokens
#[derive(Clone)]
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from a secret and token lifetimes in seconds.
    pub fn new(
        secret: &str,
        access_expires_in_seconds: u64,
        refresh_expires_in_seconds: u64,
    ) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            access_token_ttl: Self::lifetime(access_expires_in_seconds),
            refresh_token_ttl: Self::lifetime(refresh_expires_in_seconds),
        }
    }

    fn lifetime(seconds: u64) -> Duration {
        // the clamped value always fits in an i64
        Duration::seconds(seconds.min(MAX_TOKEN_LIFETIME_SECONDS) as i64)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_expires_in_seconds,
            config.refresh_token_expires_in_seconds,
        )
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_expires_in(&self) -> u64 {
        self.access_token_ttl.num_seconds().max(0) as u64
    }

    /// Generate a new access token for `subject`
    pub fn generate_token(&self, subject: &str) -> Result<IssuedToken, ServiceError> {
        self.issue(subject, self.access_token_ttl, None, None)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Generate a refresh token (longer expiration, tagged `refresh`)
    pub fn generate_refresh_token(&self, subject: &str) -> Result<IssuedToken, ServiceError> {
        self.issue(
            subject,
            self.refresh_token_ttl,
            Some(REFRESH_TOKEN_TYPE.to_string()),
            Some(Uuid::now_v7().to_string()),
        )
        .map_err(|e| {
            ServiceError::internal_error(format!("Refresh token generation failed: {}", e))
        })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| ServiceError::invalid_token(format!("Token validation failed: {}", e)))
    }

    fn issue(
        &self,
        subject: &str,
        ttl: Duration,
        typ: Option<String>,
        jti: Option<String>,
    ) -> jsonwebtoken::errors::Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
            typ,
            jti,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_at })
    }
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Check if this is a refresh token
    pub fn is_refresh(&self) -> bool {
        self.typ.as_deref() == Some(REFRESH_TOKEN_TYPE)
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as usize;
        now > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtUtils {
        JwtUtils::new("test-secret", 3600, 7 * 24 * 3600)
    }

    #[test]
    fn test_access_token_has_no_type_tag() {
        let utils = jwt();
        let issued = utils.generate_token("alice").unwrap();
        let claims = utils.validate_token(&issued.token).unwrap();

        assert_eq!(claims.subject(), "alice");
        assert!(!claims.is_refresh());
        assert!(claims.typ.is_none());
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_token_is_tagged_and_longer_lived() {
        let utils = jwt();
        let issued = utils.generate_refresh_token("alice").unwrap();
        let claims = utils.validate_token(&issued.token).unwrap();

        assert!(claims.is_refresh());
        assert_eq!(claims.typ.as_deref(), Some("refresh"));
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
        assert_eq!(issued.expires_at.timestamp() as usize, claims.exp);
    }

    #[test]
    fn test_refresh_tokens_issued_back_to_back_are_distinct() {
        let utils = jwt();
        let first = utils.generate_refresh_token("alice").unwrap();
        let second = utils.generate_refresh_token("alice").unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtUtils::new("another-secret", 3600, 3600);
        let issued = other.generate_token("alice").unwrap();

        let result = jwt().validate_token(&issued.token);
        assert!(matches!(result, Err(ServiceError::InvalidToken { .. })));
    }

    #[test]
    fn test_oversized_lifetimes_are_clamped() {
        let utils = JwtUtils::new("test-secret", u64::MAX, u64::MAX);
        assert_eq!(utils.access_token_expires_in(), MAX_TOKEN_LIFETIME_SECONDS);

        let issued = utils.generate_refresh_token("alice").unwrap();
        let claims = utils.validate_token(&issued.token).unwrap();
        assert!(!claims.is_expired());
        assert_eq!((claims.exp - claims.iat) as u64, MAX_TOKEN_LIFETIME_SECONDS);
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let result = jwt().validate_token("definitely.not.a-jwt");
        assert!(matches!(result, Err(ServiceError::InvalidToken { .. })));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let utils = jwt();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "alice".to_string(),
            iat: now - 120,
            exp: now - 60,
            typ: None,
            jti: None,
        };
        let token = encode(&Header::default(), &claims, &utils.encoding_key).unwrap();

        assert!(claims.is_expired());
        let result = utils.validate_token(&token);
        assert!(matches!(result, Err(ServiceError::InvalidToken { .. })));
    }
}
