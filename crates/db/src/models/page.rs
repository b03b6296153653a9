use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

const PAGE_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("page not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePage {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePage {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Page {
    /// Pages for one user, most recently edited first. On equal timestamps
    /// an edited page outranks one that was merely created then.
    pub async fn fetch_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Page>, sqlx::Error> {
        sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE user_id = $1 \
             ORDER BY updated_at DESC, (updated_at > created_at) DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: &CreatePage,
    ) -> Result<Page, sqlx::Error> {
        sqlx::query_as::<_, Page>(&format!(
            "INSERT INTO pages (id, user_id, title, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.content)
        .fetch_one(pool)
        .await
    }

    /// Update title and/or content, refreshing the edit timestamp. Fields
    /// left out of the payload keep their stored value.
    pub async fn update(pool: &SqlitePool, id: Uuid, data: &UpdatePage) -> Result<Page, PageError> {
        sqlx::query_as::<_, Page>(&format!(
            "UPDATE pages SET \
                 title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 updated_at = datetime('now', 'subsec') \
             WHERE id = $1 \
             RETURNING {PAGE_COLUMNS}"
        ))
        .bind(id)
        .bind(data.title.as_deref())
        .bind(data.content.as_deref())
        .fetch_optional(pool)
        .await?
        .ok_or(PageError::NotFound)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), PageError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(PageError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_pool, seed_user};

    #[tokio::test]
    async fn partial_update_keeps_the_other_field() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool).await;

        let page = Page::create(
            &pool,
            user_id,
            &CreatePage {
                title: "Retro notes".to_string(),
                content: "## Went well".to_string(),
            },
        )
        .await
        .unwrap();

        let updated = Page::update(
            &pool,
            page.id,
            &UpdatePage {
                title: None,
                content: Some("## Went well\n- shipped".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Retro notes");
        assert_eq!(updated.content, "## Went well\n- shipped");
        assert!(updated.updated_at >= page.updated_at);
    }

    #[tokio::test]
    async fn listing_orders_by_latest_edit() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool).await;

        let first = Page::create(
            &pool,
            user_id,
            &CreatePage {
                title: "First".to_string(),
                content: String::new(),
            },
        )
        .await
        .unwrap();
        Page::create(
            &pool,
            user_id,
            &CreatePage {
                title: "Second".to_string(),
                content: String::new(),
            },
        )
        .await
        .unwrap();

        Page::update(
            &pool,
            first.id,
            &UpdatePage {
                title: None,
                content: Some("touched".to_string()),
            },
        )
        .await
        .unwrap();

        let pages = Page::fetch_for_user(&pool, user_id).await.unwrap();
        assert_eq!(pages[0].title, "First");
        assert_eq!(pages[1].title, "Second");
    }

    #[tokio::test]
    async fn delete_of_missing_page_is_not_found() {
        let (pool, _temp_dir) = create_test_pool().await;

        let err = Page::delete(&pool, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PageError::NotFound));
    }
}
