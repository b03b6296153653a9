use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl User {
    /// Register a new account. The caller supplies the already-hashed
    /// password; the raw password never reaches the store.
    pub async fn create(
        pool: &SqlitePool,
        full_name: &str,
        email: &str,
        password_digest: &str,
    ) -> Result<User, UserError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, full_name, email, password_digest) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, full_name, email, password_digest, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(email)
        .bind(password_digest)
        .fetch_one(pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => UserError::EmailTaken,
            _ => UserError::Database(e),
        })
    }

    /// Look up an account by email and password digest. Both a missing
    /// account and a wrong password surface as the same error so a caller
    /// cannot probe which emails are registered.
    pub async fn find_by_credentials(
        pool: &SqlitePool,
        email: &str,
        password_digest: &str,
    ) -> Result<User, UserError> {
        sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_digest, created_at \
             FROM users WHERE email = $1 AND password_digest = $2",
        )
        .bind(email)
        .bind(password_digest)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::InvalidCredentials)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_digest, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;

        User::create(&pool, "Ada Lovelace", "ada@example.com", "digest-a")
            .await
            .unwrap();
        let err = User::create(&pool, "Someone Else", "ada@example.com", "digest-b")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailTaken));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (pool, _temp_dir) = create_test_pool().await;

        User::create(&pool, "Ada Lovelace", "ada@example.com", "digest-a")
            .await
            .unwrap();

        let wrong_password = User::find_by_credentials(&pool, "ada@example.com", "digest-b")
            .await
            .unwrap_err();
        let unknown_email = User::find_by_credentials(&pool, "nobody@example.com", "digest-a")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, UserError::InvalidCredentials));
        assert!(matches!(unknown_email, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn matching_credentials_return_the_account() {
        let (pool, _temp_dir) = create_test_pool().await;

        let created = User::create(&pool, "Ada Lovelace", "ada@example.com", "digest-a")
            .await
            .unwrap();
        let found = User::find_by_credentials(&pool, "ada@example.com", "digest-a")
            .await
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.full_name, "Ada Lovelace");
    }
}
