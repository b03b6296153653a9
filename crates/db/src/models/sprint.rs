//! Sprint model: per-user iteration windows sharing one project title.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

const SPRINT_COLUMNS: &str = "id, user_id, project_title, title, start_date, end_date, created_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Sprint {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_title: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Sprint {
    /// A sprint is current iff today falls inside its inclusive window.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSprint {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Sprint plus task tallies, for the sprint listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SprintWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub sprint: Sprint,
    pub task_count: i64,
    pub completed_count: i64,
}

impl Sprint {
    /// Sprints for one user in creation order, with task tallies.
    pub async fn fetch_with_counts(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<SprintWithCounts>, sqlx::Error> {
        sqlx::query_as::<_, SprintWithCounts>(
            "SELECT s.id, s.user_id, s.project_title, s.title, s.start_date, s.end_date, \
                    s.created_at, \
                    COUNT(t.id) AS task_count, \
                    COALESCE(SUM(CASE WHEN t.status = 'done' THEN 1 ELSE 0 END), 0) \
                        AS completed_count \
             FROM sprints s \
             LEFT JOIN tasks t ON t.sprint_id = s.id \
             WHERE s.user_id = $1 \
             GROUP BY s.id \
             ORDER BY s.created_at ASC, s.rowid ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// All sprints for one user in creation order.
    pub async fn fetch_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Sprint>, sqlx::Error> {
        sqlx::query_as::<_, Sprint>(&format!(
            "SELECT {SPRINT_COLUMNS} FROM sprints WHERE user_id = $1 \
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// The most recently created sprints, newest first. Reports cap at the
    /// ten latest; older sprints stay in storage.
    pub async fn fetch_recent(
        pool: &SqlitePool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Sprint>, sqlx::Error> {
        sqlx::query_as::<_, Sprint>(&format!(
            "SELECT {SPRINT_COLUMNS} FROM sprints WHERE user_id = $1 \
             ORDER BY created_at DESC, rowid DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Sprint-id to title lookup for board views. Missing entries are a
    /// normal state for unassigned tasks.
    pub async fn titles_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<HashMap<Uuid, String>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, title FROM sprints WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn title_of(pool: &SqlitePool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT title FROM sprints WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the user's entire sprint set in one transaction. A failure
    /// while inserting rolls the delete back, so the caller never observes
    /// a partially-replaced set.
    pub async fn replace_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
        project_title: &str,
        sprints: &[CreateSprint],
    ) -> Result<Vec<Sprint>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM sprints WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(sprints.len());
        for sprint in sprints {
            let row = sqlx::query_as::<_, Sprint>(&format!(
                "INSERT INTO sprints (id, user_id, project_title, title, start_date, end_date) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING {SPRINT_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(project_title)
            .bind(&sprint.title)
            .bind(sprint.start_date)
            .bind(sprint.end_date)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Delete all sprints for one user. Returns the number removed.
    pub async fn delete_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sprints WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_pool, seed_user};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sprint_window(start: &str, end: &str) -> Sprint {
        Sprint {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_title: "My Project".to_string(),
            title: "Sprint 1".to_string(),
            start_date: date(start),
            end_date: date(end),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn current_window_is_inclusive_on_both_ends() {
        let sprint = sprint_window("2026-08-10", "2026-08-16");

        assert!(sprint.is_current(date("2026-08-10")));
        assert!(sprint.is_current(date("2026-08-13")));
        assert!(sprint.is_current(date("2026-08-16")));
        assert!(!sprint.is_current(date("2026-08-09")));
        assert!(!sprint.is_current(date("2026-08-17")));
    }

    #[tokio::test]
    async fn replace_swaps_the_whole_set() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool).await;

        Sprint::replace_for_user(
            &pool,
            user_id,
            "Alpha",
            &[CreateSprint {
                title: "Sprint 1".to_string(),
                start_date: date("2026-08-03"),
                end_date: date("2026-08-09"),
            }],
        )
        .await
        .unwrap();

        let created = Sprint::replace_for_user(
            &pool,
            user_id,
            "Beta",
            &[
                CreateSprint {
                    title: "Sprint A".to_string(),
                    start_date: date("2026-08-10"),
                    end_date: date("2026-08-16"),
                },
                CreateSprint {
                    title: "Sprint B".to_string(),
                    start_date: date("2026-08-17"),
                    end_date: date("2026-08-23"),
                },
            ],
        )
        .await
        .unwrap();
        assert_eq!(created.len(), 2);

        let sprints = Sprint::fetch_with_counts(&pool, user_id).await.unwrap();
        assert_eq!(sprints.len(), 2);
        assert!(sprints.iter().all(|s| s.sprint.project_title == "Beta"));
    }

    #[tokio::test]
    async fn failed_replace_leaves_the_original_set_intact() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool).await;

        Sprint::replace_for_user(
            &pool,
            user_id,
            "Alpha",
            &[CreateSprint {
                title: "Sprint 1".to_string(),
                start_date: date("2026-08-03"),
                end_date: date("2026-08-09"),
            }],
        )
        .await
        .unwrap();

        // Second sprint has an inverted window and is rejected by the store.
        let result = Sprint::replace_for_user(
            &pool,
            user_id,
            "Beta",
            &[
                CreateSprint {
                    title: "Sprint A".to_string(),
                    start_date: date("2026-08-10"),
                    end_date: date("2026-08-16"),
                },
                CreateSprint {
                    title: "Backwards".to_string(),
                    start_date: date("2026-08-23"),
                    end_date: date("2026-08-17"),
                },
            ],
        )
        .await;
        assert!(result.is_err());

        let sprints = Sprint::fetch_with_counts(&pool, user_id).await.unwrap();
        assert_eq!(sprints.len(), 1);
        assert_eq!(sprints[0].sprint.title, "Sprint 1");
        assert_eq!(sprints[0].sprint.project_title, "Alpha");
    }

    #[tokio::test]
    async fn counts_tally_done_tasks_per_sprint() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool).await;

        let created = Sprint::replace_for_user(
            &pool,
            user_id,
            "Alpha",
            &[CreateSprint {
                title: "Sprint 1".to_string(),
                start_date: date("2026-08-10"),
                end_date: date("2026-08-16"),
            }],
        )
        .await
        .unwrap();
        let sprint_id = created[0].id;

        for status in ["done", "done", "todo"] {
            sqlx::query(
                "INSERT INTO tasks (id, user_id, title, status, sprint_id) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind("task")
            .bind(status)
            .bind(sprint_id)
            .execute(&pool)
            .await
            .unwrap();
        }

        let sprints = Sprint::fetch_with_counts(&pool, user_id).await.unwrap();
        assert_eq!(sprints[0].task_count, 3);
        assert_eq!(sprints[0].completed_count, 2);
    }

    #[tokio::test]
    async fn recent_listing_is_newest_first_and_capped() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user_id = seed_user(&pool).await;

        let windows: Vec<CreateSprint> = (0..12u64)
            .map(|i| CreateSprint {
                title: format!("Sprint {i}"),
                start_date: date("2026-01-01") + chrono::Days::new(7 * i),
                end_date: date("2026-01-07") + chrono::Days::new(7 * i),
            })
            .collect();
        Sprint::replace_for_user(&pool, user_id, "Alpha", &windows)
            .await
            .unwrap();

        let recent = Sprint::fetch_recent(&pool, user_id, 10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].title, "Sprint 11");
        assert_eq!(recent[9].title, "Sprint 2");
    }
}
