//! Database repository for user management operations.
//!
//! Provides CRUD operations for system users

use crate::database::models::{CreateUser, User, UserWithTokenCount};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// Repository for user database operations.
///
/// Uniqueness of `username` and `email` is enforced by the schema; callers
/// should treat a unique violation from `create_user` or `update_profile`
/// as the authoritative conflict signal.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - CreateUser DTO containing user details
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their username.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Checks if a username already exists in the system.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Checks if an email already exists in the system.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Checks if username exists excluding a specific user.
    ///
    /// # Arguments
    /// * `username` - Username to check
    /// * `exclude_user_id` - User ID to exclude from check
    pub async fn username_exists_excluding(
        &self,
        username: &str,
        exclude_user_id: i64,
    ) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? AND id != ?")
                .bind(username)
                .bind(exclude_user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Checks if email exists excluding a specific user.
    pub async fn email_exists_excluding(&self, email: &str, exclude_user_id: i64) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(exclude_user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Updates username and/or email; `None` leaves the column untouched.
    pub async fn update_profile(
        &self,
        id: i64,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET username = COALESCE(?, username), email = COALESCE(?, email)
             WHERE id = ?
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    pub async fn update_role(&self, id: i64, role: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(role)
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }

    /// Lists users ordered by id.
    pub async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Lists users with the number of refresh tokens each one owns.
    pub async fn list_users_with_token_counts(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UserWithTokenCount>> {
        let users = sqlx::query_as::<_, UserWithTokenCount>(
            r#"
            SELECT u.id, u.username, u.email, u.role, COUNT(rt.id) AS token_count
            FROM users u
            LEFT JOIN refresh_tokens rt ON rt.user_id = u.id
            GROUP BY u.id
            ORDER BY u.id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::database::models::DEFAULT_ROLE;
    use crate::repositories::is_unique_violation;

    fn new_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: DEFAULT_ROLE.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let created = repo.create_user(new_user("alice", "alice@x.com")).await.unwrap();
        assert_eq!(created.role, "user");

        let by_name = repo.get_user_by_username("alice").await.unwrap().unwrap();
        let by_email = repo.get_user_by_email("alice@x.com").await.unwrap().unwrap();
        let by_id = repo.get_user_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_id.username, "alice");

        assert!(repo.get_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_is_a_unique_violation() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        repo.create_user(new_user("alice", "alice@x.com")).await.unwrap();

        let err = repo
            .create_user(new_user("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let err = repo
            .create_user(new_user("other", "alice@x.com"))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_existence_checks_exclude_self() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let alice = repo.create_user(new_user("alice", "alice@x.com")).await.unwrap();
        let bob = repo.create_user(new_user("bob", "bob@x.com")).await.unwrap();

        assert!(repo.username_exists("alice").await.unwrap());
        assert!(repo.email_exists("bob@x.com").await.unwrap());
        assert!(!repo.username_exists_excluding("alice", alice.id).await.unwrap());
        assert!(repo.username_exists_excluding("alice", bob.id).await.unwrap());
        assert!(!repo.email_exists_excluding("bob@x.com", bob.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let alice = repo.create_user(new_user("alice", "alice@x.com")).await.unwrap();

        let updated = repo
            .update_profile(alice.id, Some("alicia"), None)
            .await
            .unwrap();
        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.email, "alice@x.com");

        let updated = repo.update_role(alice.id, "auditor").await.unwrap();
        assert_eq!(updated.role, "auditor");
    }

    #[tokio::test]
    async fn test_list_users_with_token_counts_includes_users_without_tokens() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let alice = repo.create_user(new_user("alice", "alice@x.com")).await.unwrap();
        repo.create_user(new_user("bob", "bob@x.com")).await.unwrap();

        sqlx::query("INSERT INTO refresh_tokens (user_id, token, created_at) VALUES (?, ?, ?)")
            .bind(alice.id)
            .bind("t1")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();

        let users = repo.list_users_with_token_counts(0, 100).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].token_count, 1);
        assert_eq!(users[1].token_count, 0);

        let page = repo.list_users(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].username, "bob");
    }
}
