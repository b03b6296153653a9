//! Kanban board assembly: tasks grouped into status columns with their
//! sprint names resolved.

use db::models::sprint::Sprint;
use db::models::task::{BoardBucket, Task, TaskPriority, TaskStatus};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct TaskCard {
    pub id: Uuid,
    pub title: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<chrono::NaiveDate>,
    pub subtasks_total: i64,
    pub subtasks_completed: i64,
    pub progress: i64,
    pub is_wip: bool,
    pub sprint_id: Option<Uuid>,
    pub sprint_name: Option<String>,
}

impl TaskCard {
    pub fn from_task(task: Task, sprint_titles: &HashMap<Uuid, String>) -> TaskCard {
        let sprint_name = task
            .sprint_id
            .and_then(|id| sprint_titles.get(&id).cloned());
        TaskCard {
            id: task.id,
            progress: task.progress_percent(),
            is_wip: task.is_wip(),
            sprint_name,
            title: task.title,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            subtasks_total: task.subtasks_total,
            subtasks_completed: task.subtasks_completed,
            sprint_id: task.sprint_id,
        }
    }
}

/// The four board columns. Archived tasks never appear here.
#[derive(Debug, Default, Serialize)]
pub struct BoardView {
    pub todo: Vec<TaskCard>,
    pub progress: Vec<TaskCard>,
    pub review: Vec<TaskCard>,
    pub done: Vec<TaskCard>,
}

impl BoardView {
    /// Group tasks into columns, keeping the incoming order within each.
    pub fn build(tasks: Vec<Task>, sprint_titles: &HashMap<Uuid, String>) -> BoardView {
        let mut board = BoardView::default();
        for task in tasks {
            let Some(bucket) = task.status.board_bucket() else {
                continue;
            };
            let card = TaskCard::from_task(task, sprint_titles);
            match bucket {
                BoardBucket::Todo => board.todo.push(card),
                BoardBucket::Progress => board.progress.push(card),
                BoardBucket::Review => board.review.push(card),
                BoardBucket::Done => board.done.push(card),
            }
        }
        board
    }

    pub async fn fetch_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<BoardView, sqlx::Error> {
        let tasks = Task::fetch_for_user(pool, user_id).await?;
        let titles = Sprint::titles_for_user(pool, user_id).await?;
        Ok(BoardView::build(tasks, &titles))
    }
}
