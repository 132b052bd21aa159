//! Core business logic for the authentication system.
//!
//! Sessions are an access token plus a refresh token recorded in the
//! ledger. Access tokens are stateless; refresh tokens are only honoured
//! while their ledger row is active.

use crate::auth::models::*;
use crate::database::models::{RefreshToken, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::refresh_token_repository::RefreshTokenRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::{LoginIdentifier, UserService};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::PasswordHasher;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Authentication service for login, token refresh and revocation
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: &'a JwtUtils,
    user_service: UserService<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, jwt_utils: &'a JwtUtils, hasher: PasswordHasher) -> Self {
        AuthService {
            pool,
            jwt_utils,
            user_service: UserService::new(pool, hasher),
        }
    }

    /// Authenticate a user and open a new session.
    ///
    /// Every successful login records a fresh refresh token, so several
    /// devices can hold independent sessions.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<TokenResponse> {
        let username = request.username.as_deref().filter(|s| !s.is_empty());
        let email = request.email.as_deref().filter(|s| !s.is_empty());

        let identifier = match (username, email) {
            (Some(username), _) => LoginIdentifier::Username(username),
            (None, Some(email)) => LoginIdentifier::Email(email),
            (None, None) => {
                return Err(ServiceError::bad_request(
                    "Either username or email is required",
                ));
            }
        };

        let user = self
            .user_service
            .authenticate_user(identifier, &request.password)
            .await?;

        let access = self.jwt_utils.generate_token(&user.username)?;
        let refresh = self.jwt_utils.generate_refresh_token(&user.username)?;

        RefreshTokenRepository::new(self.pool)
            .create_token(user.id, &refresh.token, Some(refresh.expires_at))
            .await?;

        info!("User {} logged in", user.username);

        Ok(self.token_response(access.token, refresh.token))
    }

    /// Exchange an active refresh token for a new access token.
    ///
    /// The refresh token itself is returned unchanged.
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> ServiceResult<TokenResponse> {
        let refresh_token = request
            .refresh_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ServiceError::bad_request("refresh_token is required"))?;

        let claims = self.jwt_utils.validate_token(&refresh_token)?;
        if !claims.is_refresh() {
            return Err(ServiceError::bad_request("Not a refresh token"));
        }

        let user = UserRepository::new(self.pool)
            .get_user_by_username(claims.subject())
            .await?
            .ok_or_else(|| ServiceError::invalid_token("Unknown token subject"))?;

        let active = RefreshTokenRepository::new(self.pool)
            .find_active_token(&refresh_token, user.id)
            .await?;
        if active.is_none() {
            warn!("Rejected refresh for user {}: token not active", user.username);
            return Err(ServiceError::InvalidOrRevokedToken);
        }

        let access = self.jwt_utils.generate_token(&user.username)?;
        Ok(self.token_response(access.token, refresh_token))
    }

    /// Resolve a bearer credential to the user it belongs to.
    ///
    /// Only access tokens are accepted; refresh tokens are rejected.
    pub async fn resolve_bearer(&self, token: &str) -> ServiceResult<User> {
        let claims = self
            .jwt_utils
            .validate_token(token)
            .map_err(|_| ServiceError::unauthenticated("Could not validate credentials"))?;

        if claims.subject().is_empty() {
            return Err(ServiceError::unauthenticated("Token has no subject"));
        }

        if claims.is_refresh() {
            warn!("Refresh token presented as bearer credential");
            return Err(ServiceError::unauthenticated(
                "Refresh tokens cannot be used as bearer credentials",
            ));
        }

        UserRepository::new(self.pool)
            .get_user_by_username(claims.subject())
            .await?
            .ok_or_else(|| ServiceError::unauthenticated("Could not validate credentials"))
    }

    /// Revoke one of the caller's refresh tokens by its string value.
    pub async fn revoke_my_token(
        &self,
        user: &User,
        request: RefreshTokenRequest,
    ) -> ServiceResult<()> {
        let token = Self::required_token(request)?;
        let repo = RefreshTokenRepository::new(self.pool);

        let row = repo
            .find_token_for_user(&token, user.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Refresh token", "provided token"))?;

        repo.revoke_token(row.id).await?;
        info!("User {} revoked refresh token id={}", user.username, row.id);
        Ok(())
    }

    /// Revoke one of the caller's refresh tokens by ledger id.
    pub async fn revoke_my_token_by_id(&self, user: &User, id: i64) -> ServiceResult<()> {
        let repo = RefreshTokenRepository::new(self.pool);

        let row = repo
            .find_token_by_id_for_user(id, user.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Refresh token", id.to_string()))?;

        repo.revoke_token(row.id).await?;
        info!("User {} revoked refresh token id={}", user.username, row.id);
        Ok(())
    }

    pub async fn list_my_tokens(&self, user: &User) -> ServiceResult<Vec<RefreshToken>> {
        let tokens = RefreshTokenRepository::new(self.pool)
            .list_tokens_for_user(user.id)
            .await?;
        Ok(tokens)
    }

    /// Revoke every refresh token owned by `username`.
    ///
    /// A user without tokens is a successful no-op.
    pub async fn revoke_all_for_username(&self, username: &str) -> ServiceResult<RevokeAllResponse> {
        let user = self
            .user_service
            .get_user_by_username_required(username)
            .await?;

        let revoked = RefreshTokenRepository::new(self.pool)
            .revoke_all_for_user(user.id)
            .await?;

        info!("Revoked {} refresh tokens for user {}", revoked, user.username);
        Ok(RevokeAllResponse {
            username: user.username,
            revoked,
        })
    }

    /// Revoke any refresh token in the ledger by its string value.
    pub async fn admin_revoke_token(&self, request: RefreshTokenRequest) -> ServiceResult<()> {
        let token = Self::required_token(request)?;
        let repo = RefreshTokenRepository::new(self.pool);

        let row = repo
            .find_token(&token)
            .await?
            .ok_or_else(|| ServiceError::not_found("Refresh token", "provided token"))?;

        repo.revoke_token(row.id).await?;
        info!("Admin revoked refresh token id={} of user id={}", row.id, row.user_id);
        Ok(())
    }

    pub async fn list_tokens_for_username(&self, username: &str) -> ServiceResult<Vec<RefreshToken>> {
        let user = self
            .user_service
            .get_user_by_username_required(username)
            .await?;

        let tokens = RefreshTokenRepository::new(self.pool)
            .list_tokens_for_user(user.id)
            .await?;
        Ok(tokens)
    }

    pub async fn list_all_tokens(&self) -> ServiceResult<Vec<RefreshToken>> {
        let tokens = RefreshTokenRepository::new(self.pool).list_all_tokens().await?;
        Ok(tokens)
    }

    fn required_token(request: RefreshTokenRequest) -> ServiceResult<String> {
        request
            .refresh_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ServiceError::bad_request("refresh_token is required"))
    }

    fn token_response(&self, access_token: String, refresh_token: String) -> TokenResponse {
        TokenResponse {
            access_token,
            refresh_token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            expires_in: self.jwt_utils.access_token_expires_in(),
        }
    }
}
