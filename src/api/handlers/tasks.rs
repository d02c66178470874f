//! Task endpoints.

use crate::{
    api::{
        caller::Caller,
        dto::{self, ChangeStateRequest, MoveTaskRequest, TaskActionResponse, TaskResponse},
        error::ApiResult,
        json::ApiJson,
        state::{AppState, WorkflowBackend},
    },
    workflow::{
        domain::{BoardId, Task, TaskChanges, TaskId},
        services::{TaskDraft, TaskView},
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

async fn respond<B: WorkflowBackend>(
    state: &AppState<B>,
    task: Task,
) -> ApiResult<Json<TaskResponse>> {
    let assignees = state.assignments().list_assignees(task.id()).await?;
    Ok(Json(TaskResponse::from(&TaskView { task, assignees })))
}

/// `POST /tasks`
pub async fn create<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    ApiJson(draft): ApiJson<TaskDraft>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = state.tasks().create(&caller, draft).await?;
    let view = TaskView {
        task,
        assignees: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&view))))
}

/// `GET /tasks/{id}`
pub async fn get<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<TaskResponse>> {
    let view = state.tasks().get(id).await?;
    Ok(Json(TaskResponse::from(&view)))
}

/// `GET /tasks/board/{boardId}`
pub async fn list_by_board<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(board_id): Path<BoardId>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let views = state.tasks().list_by_board(board_id).await?;
    Ok(Json(dto::list(&views)))
}

/// `GET /tasks/{id}/actions`
pub async fn history<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<Vec<TaskActionResponse>>> {
    let actions = state.tasks().history(id).await?;
    Ok(Json(dto::list(&actions)))
}

/// `PUT /tasks/{id}`
pub async fn update<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<TaskId>,
    ApiJson(changes): ApiJson<TaskChanges>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks().update(&caller, id, &changes).await?;
    respond(&state, task).await
}

/// `PUT /tasks/{id}/move`
pub async fn move_task<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<TaskId>,
    ApiJson(request): ApiJson<MoveTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks().move_task(&caller, id, request.direction).await?;
    respond(&state, task).await
}

/// `PUT /tasks/{id}/state`
pub async fn change_state<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<TaskId>,
    ApiJson(request): ApiJson<ChangeStateRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .tasks()
        .change_state_by_code(&caller, id, &request.code)
        .await?;
    respond(&state, task).await
}

/// `DELETE /tasks/{id}`
pub async fn delete<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<TaskId>,
) -> ApiResult<StatusCode> {
    state.tasks().delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
