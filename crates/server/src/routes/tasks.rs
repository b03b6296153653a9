use axum::{
    Json, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::NaiveDate;
use db::models::sprint::Sprint;
use db::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};
use services::services::board::{BoardView, TaskCard};
use std::collections::HashMap;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct TaskRef {
    pub task_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub task_id: Uuid,
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct PriorityUpdate {
    pub task_id: Uuid,
    pub priority: TaskPriority,
}

#[derive(Debug, Deserialize)]
pub struct DueDateUpdate {
    pub task_id: Uuid,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SprintAssignment {
    pub task_id: Uuid,
    pub sprint_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SubtaskCounter {
    pub task_id: Uuid,
    pub subtasks_completed: i64,
}

#[derive(Debug, Serialize)]
pub struct SubtaskResponse {
    pub task: TaskCard,
    pub auto_completed: bool,
}

#[derive(Debug, Serialize)]
pub struct SprintAssignmentResponse {
    pub task: TaskCard,
    pub sprint_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UnarchiveResponse {
    pub task: Task,
    pub restored_to: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct RepairResponse {
    pub repaired: u64,
}

/// Archived listing row: the stored task plus its resolved sprint name.
#[derive(Debug, Serialize)]
pub struct ArchivedTask {
    #[serde(flatten)]
    pub task: Task,
    pub sprint_name: Option<String>,
}

async fn card_for(state: &AppState, task: Task) -> Result<TaskCard, ApiError> {
    let titles = match task.sprint_id {
        Some(sprint_id) => match Sprint::title_of(&state.db.pool, sprint_id).await? {
            Some(title) => HashMap::from([(sprint_id, title)]),
            None => HashMap::new(),
        },
        None => HashMap::new(),
    };
    Ok(TaskCard::from_task(task, &titles))
}

pub async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ResponseJson<ApiResponse<BoardView>>, ApiError> {
    let board = BoardView::fetch_for_user(&state.db.pool, query.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<TaskCard>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let task = Task::create(&state.db.pool, &payload, Uuid::new_v4()).await?;
    let card = card_for(&state, task).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        card,
        "Task created",
    )))
}

pub async fn update_status(
    State(state): State<AppState>,
    Json(payload): Json<StatusUpdate>,
) -> Result<ResponseJson<ApiResponse<TaskCard>>, ApiError> {
    let task = Task::update_status(&state.db.pool, payload.task_id, payload.status).await?;
    let card = card_for(&state, task).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        card,
        "Task status updated",
    )))
}

pub async fn update_priority(
    State(state): State<AppState>,
    Json(payload): Json<PriorityUpdate>,
) -> Result<ResponseJson<ApiResponse<TaskCard>>, ApiError> {
    let task = Task::update_priority(&state.db.pool, payload.task_id, payload.priority).await?;
    let card = card_for(&state, task).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        card,
        "Task priority updated",
    )))
}

pub async fn update_due_date(
    State(state): State<AppState>,
    Json(payload): Json<DueDateUpdate>,
) -> Result<ResponseJson<ApiResponse<TaskCard>>, ApiError> {
    let task = Task::update_due_date(&state.db.pool, payload.task_id, payload.due_date).await?;
    let card = card_for(&state, task).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        card,
        "Task due date updated",
    )))
}

pub async fn assign_sprint(
    State(state): State<AppState>,
    Json(payload): Json<SprintAssignment>,
) -> Result<ResponseJson<ApiResponse<SprintAssignmentResponse>>, ApiError> {
    let task = Task::assign_sprint(&state.db.pool, payload.task_id, payload.sprint_id).await?;
    let card = card_for(&state, task).await?;
    let sprint_name = card.sprint_name.clone();
    Ok(ResponseJson(ApiResponse::success(
        SprintAssignmentResponse {
            task: card,
            sprint_name,
        },
    )))
}

pub async fn set_subtasks(
    State(state): State<AppState>,
    Json(payload): Json<SubtaskCounter>,
) -> Result<ResponseJson<ApiResponse<SubtaskResponse>>, ApiError> {
    let update =
        Task::set_subtasks_completed(&state.db.pool, payload.task_id, payload.subtasks_completed)
            .await?;
    let auto_completed = update.auto_completed;
    let card = card_for(&state, update.task).await?;
    Ok(ResponseJson(ApiResponse::success(SubtaskResponse {
        task: card,
        auto_completed,
    })))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Json(payload): Json<TaskRef>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Task::delete(&state.db.pool, payload.task_id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Task deleted successfully",
    )))
}

pub async fn archive_task(
    State(state): State<AppState>,
    Json(payload): Json<TaskRef>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = Task::archive(&state.db.pool, payload.task_id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        task,
        "Task archived",
    )))
}

pub async fn unarchive_task(
    State(state): State<AppState>,
    Json(payload): Json<TaskRef>,
) -> Result<ResponseJson<ApiResponse<UnarchiveResponse>>, ApiError> {
    let unarchived = Task::unarchive(&state.db.pool, payload.task_id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        UnarchiveResponse {
            task: unarchived.task,
            restored_to: unarchived.restored_to,
        },
        "Task restored",
    )))
}

pub async fn get_archived(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ArchivedTask>>>, ApiError> {
    let tasks = Task::fetch_archived_for_user(&state.db.pool, query.user_id).await?;
    let titles = Sprint::titles_for_user(&state.db.pool, query.user_id).await?;

    let archived = tasks
        .into_iter()
        .map(|task| {
            let sprint_name = task.sprint_id.and_then(|id| titles.get(&id).cloned());
            ArchivedTask { task, sprint_name }
        })
        .collect();
    Ok(ResponseJson(ApiResponse::success(archived)))
}

pub async fn repair_completed(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<RepairResponse>>, ApiError> {
    let repaired = Task::repair_completed(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(RepairResponse {
        repaired,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(get_board).post(create_task))
            .route("/status", post(update_status))
            .route("/priority", post(update_priority))
            .route("/due-date", post(update_due_date))
            .route("/sprint", post(assign_sprint))
            .route("/subtasks", post(set_subtasks))
            .route("/delete", post(delete_task))
            .route("/archive", post(archive_task))
            .route("/unarchive", post(unarchive_task))
            .route("/archived", get(get_archived))
            .route("/repair-completed", post(repair_completed)),
    )
}
