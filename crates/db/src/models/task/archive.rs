//! Archive / unarchive state machine for tasks.
//!
//! Archiving remembers the status the task had so unarchiving can restore
//! it. Archiving an already-archived task is a no-op; overwriting
//! `previous_status` with `archived` would lose the restore target.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{TASK_COLUMNS, Task, TaskError, TaskStatus};

/// Outcome of an unarchive call, reported back for UI feedback.
#[derive(Debug)]
pub struct Unarchived {
    pub task: Task,
    pub restored_to: TaskStatus,
}

impl Task {
    /// Record the current status and move the task to `archived`.
    pub async fn archive(pool: &SqlitePool, id: Uuid) -> Result<Task, TaskError> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TaskError::NotFound)?;

        if task.status == TaskStatus::Archived {
            tx.commit().await?;
            return Ok(task);
        }

        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET previous_status = $1, status = 'archived', \
                              updated_at = datetime('now', 'subsec') \
             WHERE id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.status)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Restore the remembered status (defaulting to `todo`) and clear it.
    pub async fn unarchive(pool: &SqlitePool, id: Uuid) -> Result<Unarchived, TaskError> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TaskError::NotFound)?;

        let restored_to = task.previous_status.unwrap_or(TaskStatus::Todo);

        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET status = $1, previous_status = NULL, \
                              updated_at = datetime('now', 'subsec') \
             WHERE id = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(restored_to)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Unarchived { task, restored_to })
    }
}
