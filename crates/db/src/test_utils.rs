//! Helpers for creating per-test database pools.

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tempfile::TempDir;

/// Create a test database pool with migrations applied.
///
/// Returns the pool and a TempDir that must be kept alive for the duration
/// of the test.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
        .expect("Invalid database URL")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .expect("Failed to create pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (pool, temp_dir)
}

/// Insert a user row and return its id. Most fixtures hang off a user.
pub async fn seed_user(pool: &SqlitePool) -> uuid::Uuid {
    let id = uuid::Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, full_name, email, password_digest) VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind("Test User")
    .bind(format!("{id}@example.com"))
    .bind("digest")
    .execute(pool)
    .await
    .expect("Failed to insert test user");
    id
}
