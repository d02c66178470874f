//! Assignment endpoints.

use crate::{
    api::{
        caller::Caller,
        dto::{AssignRequest, AssignmentResponse},
        error::ApiResult,
        json::ApiJson,
        state::{AppState, WorkflowBackend},
    },
    workflow::domain::{AccountId, TaskId},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `POST /account-tasks`
pub async fn assign<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    ApiJson(request): ApiJson<AssignRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentResponse>)> {
    let assignment = state
        .assignments()
        .assign(&caller, request.task_id, request.account_id)
        .await?;
    Ok((StatusCode::CREATED, Json(AssignmentResponse::from(&assignment))))
}

/// `GET /account-tasks/{taskId}`
pub async fn list<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<AccountId>>> {
    let assignees = state.assignments().list_assignees(task_id).await?;
    Ok(Json(assignees))
}

/// `DELETE /account-tasks/{taskId}/{accountId}`
pub async fn unassign<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path((task_id, account_id)): Path<(TaskId, AccountId)>,
) -> ApiResult<StatusCode> {
    state
        .assignments()
        .unassign(&caller, task_id, account_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
