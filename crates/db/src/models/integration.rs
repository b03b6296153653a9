use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use std::fmt;
use uuid::Uuid;

const INTEGRATION_COLUMNS: &str = "id, user_id, platform, repo_url, access_token, connected_at";

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("integration not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Git hosting platforms a user can connect. One connection per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "platform", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Github,
    Gitlab,
    Bitbucket,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Github => write!(f, "github"),
            Platform::Gitlab => write!(f, "gitlab"),
            Platform::Bitbucket => write!(f, "bitbucket"),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Integration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: Platform,
    pub repo_url: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectIntegration {
    pub platform: Platform,
    pub repo_url: String,
    #[serde(default)]
    pub access_token: String,
}

impl Integration {
    pub async fn fetch_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Integration>, sqlx::Error> {
        sqlx::query_as::<_, Integration>(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE user_id = $1 \
             ORDER BY connected_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_for_platform(
        pool: &SqlitePool,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<Integration>, sqlx::Error> {
        sqlx::query_as::<_, Integration>(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations \
             WHERE user_id = $1 AND platform = $2"
        ))
        .bind(user_id)
        .bind(platform)
        .fetch_optional(pool)
        .await
    }

    /// Connect a platform, replacing any existing connection for it. The
    /// connection timestamp is refreshed on reconnect.
    pub async fn upsert(
        pool: &SqlitePool,
        user_id: Uuid,
        data: &ConnectIntegration,
    ) -> Result<Integration, sqlx::Error> {
        sqlx::query_as::<_, Integration>(&format!(
            "INSERT INTO integrations (id, user_id, platform, repo_url, access_token) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, platform) DO UPDATE SET \
                 repo_url = excluded.repo_url, \
                 access_token = excluded.access_token, \
                 connected_at = datetime('now', 'subsec') \
             RETURNING {INTEGRATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(data.platform)
        .bind(&data.repo_url)
        .bind(&data.access_token)
        .fetch_one(pool)
        .await
    }

    pub async fn disconnect(
        pool: &SqlitePool,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<(), IntegrationError> {
        let result = sqlx::query("DELETE FROM integrations WHERE user_id = $1 AND platform = $2")
            .bind(user_id)
            .bind(platform)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(IntegrationError::NotFound);
        }
        Ok(())
    }
}
