//! Task model: kanban cards with subtask counters, sprint references and an
//! archive state machine.

mod archive;
mod queries;

pub use archive::Unarchived;

/// Shared column list so every query decodes into the same `Task` shape.
pub(crate) const TASK_COLUMNS: &str =
    "id, user_id, title, priority, status, due_date, subtasks_total, \
     subtasks_completed, sprint_id, previous_status, created_at, updated_at";

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum::{Display, EnumString};
use thiserror::Error;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, EnumString, Display,
    Default,
)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Progress,
    Review,
    Done,
    Archived,
}

/// Kanban column a task is displayed in. Archived tasks have no column and
/// are surfaced only through the archived listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardBucket {
    Todo,
    Progress,
    Review,
    Done,
}

impl TaskStatus {
    /// Total mapping from status to board column. `None` means "excluded
    /// from the board view", not an unknown value.
    pub fn board_bucket(self) -> Option<BoardBucket> {
        match self {
            TaskStatus::Todo => Some(BoardBucket::Todo),
            TaskStatus::Progress => Some(BoardBucket::Progress),
            TaskStatus::Review => Some(BoardBucket::Review),
            TaskStatus::Done => Some(BoardBucket::Done),
            TaskStatus::Archived => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, EnumString, Display,
    Default,
)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub subtasks_total: i64,
    pub subtasks_completed: i64,
    pub sprint_id: Option<Uuid>,
    /// Status to restore on unarchive. Populated only while archived.
    pub previous_status: Option<TaskStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Subtask completion as a whole percentage, floored. A task with no
    /// subtasks reports 0.
    pub fn progress_percent(&self) -> i64 {
        if self.subtasks_total > 0 {
            self.subtasks_completed * 100 / self.subtasks_total
        } else {
            0
        }
    }

    pub fn is_wip(&self) -> bool {
        self.status == TaskStatus::Progress
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub subtasks_total: i64,
    pub sprint_id: Option<Uuid>,
}

/// Outcome of a subtask counter update.
#[derive(Debug)]
pub struct SubtaskUpdate {
    pub task: Task,
    /// True only when this call transitioned the task to `done`.
    pub auto_completed: bool,
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_subtasks(completed: i64, total: i64) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Test Task".to_string(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Todo,
            due_date: None,
            subtasks_total: total,
            subtasks_completed: completed,
            sprint_id: None,
            previous_status: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn progress_is_zero_without_subtasks() {
        assert_eq!(task_with_subtasks(0, 0).progress_percent(), 0);
    }

    #[test]
    fn progress_is_floored() {
        assert_eq!(task_with_subtasks(1, 3).progress_percent(), 33);
        assert_eq!(task_with_subtasks(2, 3).progress_percent(), 66);
        assert_eq!(task_with_subtasks(3, 3).progress_percent(), 100);
        assert_eq!(task_with_subtasks(1, 4).progress_percent(), 25);
    }

    #[test]
    fn only_archived_is_excluded_from_board() {
        assert_eq!(
            TaskStatus::Todo.board_bucket(),
            Some(BoardBucket::Todo)
        );
        assert_eq!(
            TaskStatus::Progress.board_bucket(),
            Some(BoardBucket::Progress)
        );
        assert_eq!(
            TaskStatus::Review.board_bucket(),
            Some(BoardBucket::Review)
        );
        assert_eq!(TaskStatus::Done.board_bucket(), Some(BoardBucket::Done));
        assert_eq!(TaskStatus::Archived.board_bucket(), None);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for (status, s) in [
            (TaskStatus::Todo, "todo"),
            (TaskStatus::Progress, "progress"),
            (TaskStatus::Review, "review"),
            (TaskStatus::Done, "done"),
            (TaskStatus::Archived, "archived"),
        ] {
            assert_eq!(status.to_string(), s);
            assert_eq!(s.parse::<TaskStatus>().unwrap(), status);
        }
    }
}
