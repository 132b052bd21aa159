//! User business logic service.
//!
//! Handles registration, credential checks, profile changes and role
//! management.

use crate::config::BootstrapAdmin;
use crate::database::models::{
    ADMIN_ROLE, ChangePasswordRequest, CreateUser, DEFAULT_ROLE, ListQuery, RegisterRequest,
    RoleUpdateRequest, UpdateProfileRequest, User, UserWithTokenCount,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::is_unique_violation;
use crate::repositories::user_repository::UserRepository;
use crate::utils::password::PasswordHasher;
use sqlx::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

/// How a user identifies themselves at login.
#[derive(Debug, Clone, Copy)]
pub enum LoginIdentifier<'a> {
    Username(&'a str),
    Email(&'a str),
}

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    hasher: PasswordHasher,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `hasher` - Password hasher configured at startup
    pub fn new(pool: &'a SqlitePool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    /// Registers a new user with the default role.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - Username or email already in use
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<User> {
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        self.create_user(request, DEFAULT_ROLE).await
    }

    async fn create_user(&self, request: RegisterRequest, role: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        // Best-effort pre-check; the unique index below is authoritative.
        if repo.username_exists(&request.username).await?
            || repo.email_exists(&request.email).await?
        {
            return Err(ServiceError::already_exists(
                "Username or email",
                &request.username,
            ));
        }

        let password_hash = self.hasher.hash(&request.password).await?;

        let data = CreateUser {
            username: request.username.clone(),
            email: request.email,
            password_hash,
            role: role.to_string(),
        };

        match repo.create_user(data).await {
            Ok(user) => {
                info!("Registered user id={}, username={}", user.id, user.username);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => Err(ServiceError::already_exists(
                "Username or email",
                request.username,
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Verifies a username-or-email / password pair.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn authenticate_user(
        &self,
        identifier: LoginIdentifier<'_>,
        password: &str,
    ) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = match identifier {
            LoginIdentifier::Username(username) => repo.get_user_by_username(username).await?,
            LoginIdentifier::Email(email) => repo.get_user_by_email(email).await?,
        };

        if let Some(user) = user {
            if self.hasher.verify(password, &user.password_hash).await {
                return Ok(user);
            }
        }

        warn!("Rejected login attempt for {:?}", identifier);
        Err(ServiceError::unauthenticated("Invalid credentials"))
    }

    /// Retrieves a user by username with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if user doesn't exist
    pub async fn get_user_by_username_required(&self, username: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", username))?;
        Ok(user)
    }

    /// Updates the caller's username and/or email.
    pub async fn update_profile(
        &self,
        user: &User,
        request: UpdateProfileRequest,
    ) -> ServiceResult<User> {
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let repo = UserRepository::new(self.pool);

        if let Some(username) = request.username.as_deref() {
            if repo.username_exists_excluding(username, user.id).await? {
                return Err(ServiceError::already_exists("Username", username));
            }
        }

        if let Some(email) = request.email.as_deref() {
            if repo.email_exists_excluding(email, user.id).await? {
                return Err(ServiceError::already_exists("Email", email));
            }
        }

        let updated = repo
            .update_profile(user.id, request.username.as_deref(), request.email.as_deref())
            .await;

        match updated {
            Ok(updated) => {
                info!("User id={} updated their profile", updated.id);
                Ok(updated)
            }
            Err(e) if is_unique_violation(&e) => Err(ServiceError::already_exists(
                "Username or email",
                request.username.unwrap_or_else(|| user.username.clone()),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Changes the caller's password after checking the current one.
    pub async fn change_password(
        &self,
        user: &User,
        request: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        if request.new_password == request.current_password {
            return Err(ServiceError::validation(
                "new_password: New password must differ from the current password",
            ));
        }

        if !self
            .hasher
            .verify(&request.current_password, &user.password_hash)
            .await
        {
            return Err(ServiceError::bad_request("Current password is incorrect"));
        }

        let password_hash = self.hasher.hash(&request.new_password).await?;
        UserRepository::new(self.pool)
            .update_password_hash(user.id, &password_hash)
            .await?;

        info!("User id={} changed their password", user.id);
        Ok(())
    }

    /// Sets the role of `username`; roles are free-form strings.
    pub async fn set_role(&self, username: &str, request: RoleUpdateRequest) -> ServiceResult<User> {
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let user = self.get_user_by_username_required(username).await?;
        let updated = UserRepository::new(self.pool)
            .update_role(user.id, &request.role)
            .await?;

        info!("Role of user {} set to {}", updated.username, updated.role);
        Ok(updated)
    }

    pub async fn list_users(&self, query: &ListQuery) -> ServiceResult<Vec<User>> {
        query
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let users = UserRepository::new(self.pool)
            .list_users(query.skip(), query.limit())
            .await?;
        Ok(users)
    }

    pub async fn list_users_with_token_counts(
        &self,
        query: &ListQuery,
    ) -> ServiceResult<Vec<UserWithTokenCount>> {
        query
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        let users = UserRepository::new(self.pool)
            .list_users_with_token_counts(query.skip(), query.limit())
            .await?;
        Ok(users)
    }

    /// Creates the configured admin account, or promotes it if it already exists.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        if let Some(existing) = repo.get_user_by_username(&admin.username).await? {
            if existing.is_admin() {
                return Ok(existing);
            }
            let promoted = repo.update_role(existing.id, ADMIN_ROLE).await?;
            info!("Promoted existing user {} to admin", promoted.username);
            return Ok(promoted);
        }

        let request = RegisterRequest {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
        };
        request
            .validate()
            .map_err(ServiceError::from_validation_errors)?;

        self.create_user(request, ADMIN_ROLE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn setup() -> Database {
        Database::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_register_then_duplicate_username_or_email_conflicts() {
        let db = setup().await;
        let service = UserService::new(db.pool(), PasswordHasher::new(4));

        let alice = service
            .register(register_request("alice", "alice@x.com", "pw123456"))
            .await
            .unwrap();
        assert_eq!(alice.role, DEFAULT_ROLE);
        assert_ne!(alice.password_hash, "pw123456");

        let same_name = service
            .register(register_request("alice", "new@x.com", "pw123456"))
            .await;
        assert!(matches!(same_name, Err(ServiceError::AlreadyExists { .. })));

        let same_email = service
            .register(register_request("alice2", "alice@x.com", "pw123456"))
            .await;
        assert!(matches!(same_email, Err(ServiceError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let db = setup().await;
        let service = UserService::new(db.pool(), PasswordHasher::new(4));

        for request in [
            register_request("al", "alice@x.com", "pw123456"),
            register_request("alice", "not-an-email", "pw123456"),
            register_request("alice", "alice@x.com", "short"),
        ] {
            let result = service.register(request).await;
            assert!(matches!(result, Err(ServiceError::Validation { .. })));
        }
    }

    #[tokio::test]
    async fn test_authenticate_by_username_or_email() {
        let db = setup().await;
        let service = UserService::new(db.pool(), PasswordHasher::new(4));
        service
            .register(register_request("alice", "alice@x.com", "pw123456"))
            .await
            .unwrap();

        let by_name = service
            .authenticate_user(LoginIdentifier::Username("alice"), "pw123456")
            .await
            .unwrap();
        let by_email = service
            .authenticate_user(LoginIdentifier::Email("alice@x.com"), "pw123456")
            .await
            .unwrap();
        assert_eq!(by_name.id, by_email.id);

        let wrong_password = service
            .authenticate_user(LoginIdentifier::Username("alice"), "nope-nope")
            .await;
        assert!(matches!(wrong_password, Err(ServiceError::Unauthenticated { .. })));

        let unknown = service
            .authenticate_user(LoginIdentifier::Username("ghost"), "pw123456")
            .await;
        assert!(matches!(unknown, Err(ServiceError::Unauthenticated { .. })));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_username() {
        let db = setup().await;
        let service = UserService::new(db.pool(), PasswordHasher::new(4));
        let alice = service
            .register(register_request("alice", "alice@x.com", "pw123456"))
            .await
            .unwrap();
        service
            .register(register_request("bob", "bob@x.com", "pw123456"))
            .await
            .unwrap();

        let taken = service
            .update_profile(
                &alice,
                UpdateProfileRequest {
                    username: Some("bob".to_string()),
                    email: None,
                },
            )
            .await;
        assert!(matches!(taken, Err(ServiceError::AlreadyExists { .. })));

        // keeping your own email is not a conflict
        let updated = service
            .update_profile(
                &alice,
                UpdateProfileRequest {
                    username: Some("alicia".to_string()),
                    email: Some("alice@x.com".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "alicia");
    }

    #[tokio::test]
    async fn test_change_password() {
        let db = setup().await;
        let service = UserService::new(db.pool(), PasswordHasher::new(4));
        let alice = service
            .register(register_request("alice", "alice@x.com", "pw123456"))
            .await
            .unwrap();

        let wrong_current = service
            .change_password(
                &alice,
                ChangePasswordRequest {
                    current_password: "wrong-pass".to_string(),
                    new_password: "newpass789".to_string(),
                },
            )
            .await;
        assert!(matches!(wrong_current, Err(ServiceError::BadRequest { .. })));

        let unchanged = service
            .change_password(
                &alice,
                ChangePasswordRequest {
                    current_password: "pw123456".to_string(),
                    new_password: "pw123456".to_string(),
                },
            )
            .await;
        assert!(matches!(unchanged, Err(ServiceError::Validation { .. })));

        service
            .change_password(
                &alice,
                ChangePasswordRequest {
                    current_password: "pw123456".to_string(),
                    new_password: "newpass789".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(
            service
                .authenticate_user(LoginIdentifier::Username("alice"), "newpass789")
                .await
                .is_ok()
        );
        assert!(
            service
                .authenticate_user(LoginIdentifier::Username("alice"), "pw123456")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_set_role_accepts_any_string_and_requires_existing_user() {
        let db = setup().await;
        let service = UserService::new(db.pool(), PasswordHasher::new(4));
        service
            .register(register_request("alice", "alice@x.com", "pw123456"))
            .await
            .unwrap();

        let updated = service
            .set_role(
                "alice",
                RoleUpdateRequest {
                    role: "auditor".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, "auditor");

        let missing = service
            .set_role(
                "ghost",
                RoleUpdateRequest {
                    role: "admin".to_string(),
                },
            )
            .await;
        assert!(matches!(missing, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_then_is_stable() {
        let db = setup().await;
        let service = UserService::new(db.pool(), PasswordHasher::new(4));
        let admin = BootstrapAdmin {
            username: "root".to_string(),
            email: "root@x.com".to_string(),
            password: "rootpass".to_string(),
        };

        let created = service.ensure_admin(&admin).await.unwrap();
        assert!(created.is_admin());

        let again = service.ensure_admin(&admin).await.unwrap();
        assert_eq!(again.id, created.id);
    }
}
