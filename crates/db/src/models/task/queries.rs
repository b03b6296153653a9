//! Query operations for tasks.

use sqlx::SqlitePool;
use uuid::Uuid;

use chrono::NaiveDate;

use super::{CreateTask, SubtaskUpdate, TASK_COLUMNS, Task, TaskError, TaskStatus};

impl Task {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// All tasks for one user, oldest first.
    pub async fn fetch_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn fetch_archived_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 AND status = 'archived' \
             ORDER BY updated_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Most recently created tasks for one user, for the activity feed.
    pub async fn fetch_recent_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 \
             ORDER BY created_at DESC, rowid DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Tasks referencing any of the given sprints, for reporting.
    pub async fn fetch_for_sprints(
        pool: &SqlitePool,
        sprint_ids: &[Uuid],
    ) -> Result<Vec<Task>, sqlx::Error> {
        if sprint_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=sprint_ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE sprint_id IN ({placeholders})");
        let mut query = sqlx::query_as::<_, Task>(&sql);
        for id in sprint_ids {
            query = query.bind(id);
        }
        query.fetch_all(pool).await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTask,
        id: Uuid,
    ) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, user_id, title, priority, status, due_date, subtasks_total, \
                                subtasks_completed, sprint_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(data.user_id)
        .bind(&data.title)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.due_date)
        .bind(data.subtasks_total.max(0))
        .bind(data.sprint_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, TaskError> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET status = $1, updated_at = datetime('now', 'subsec') \
             WHERE id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(TaskError::NotFound)
    }

    pub async fn update_priority(
        pool: &SqlitePool,
        id: Uuid,
        priority: super::TaskPriority,
    ) -> Result<Task, TaskError> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET priority = $1, updated_at = datetime('now', 'subsec') \
             WHERE id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(priority)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(TaskError::NotFound)
    }

    pub async fn update_due_date(
        pool: &SqlitePool,
        id: Uuid,
        due_date: NaiveDate,
    ) -> Result<Task, TaskError> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET due_date = $1, updated_at = datetime('now', 'subsec') \
             WHERE id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(due_date)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(TaskError::NotFound)
    }

    /// Assign the task to a sprint, or clear the assignment with `None`.
    pub async fn assign_sprint(
        pool: &SqlitePool,
        id: Uuid,
        sprint_id: Option<Uuid>,
    ) -> Result<Task, TaskError> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET sprint_id = $1, updated_at = datetime('now', 'subsec') \
             WHERE id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(sprint_id)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(TaskError::NotFound)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), TaskError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound);
        }
        Ok(())
    }

    /// Update the completed-subtask counter (clamped to `[0, total]`) and
    /// apply the auto-completion rule: a task whose counter reaches its total
    /// moves to `done`.
    ///
    /// Idempotent: a task already `done` is never re-signaled, so repeating
    /// the same call reports `auto_completed = false`.
    pub async fn set_subtasks_completed(
        pool: &SqlitePool,
        id: Uuid,
        completed: i64,
    ) -> Result<SubtaskUpdate, TaskError> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TaskError::NotFound)?;

        let completed = completed.clamp(0, task.subtasks_total);
        let auto_completed = task.subtasks_total > 0
            && completed >= task.subtasks_total
            && task.status != TaskStatus::Done;
        let status = if auto_completed {
            TaskStatus::Done
        } else {
            task.status
        };

        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET subtasks_completed = $1, status = $2, \
                              updated_at = datetime('now', 'subsec') \
             WHERE id = $3 RETURNING {TASK_COLUMNS}"
        ))
        .bind(completed)
        .bind(status)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SubtaskUpdate {
            task,
            auto_completed,
        })
    }

    /// One-shot repair: move every fully-completed task to `done`.
    /// Returns the number of tasks transitioned.
    pub async fn repair_completed(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET status = 'done', updated_at = datetime('now', 'subsec') \
             WHERE subtasks_total > 0 \
               AND subtasks_completed >= subtasks_total \
               AND status != 'done'",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
