//! Task state endpoints.
//!
//! `POST /task-states/{id}` takes a board id while the other routes on the
//! same path take a state id.

use crate::{
    api::{
        caller::Caller,
        dto::{self, InsertStateRequest, ReorderStateRequest, StateSwapResponse, TaskStateResponse},
        error::ApiResult,
        json::ApiJson,
        state::{AppState, WorkflowBackend},
    },
    workflow::{
        domain::{BoardId, TaskStateId},
        services::TaskStateChanges,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `POST /task-states/{boardId}`
pub async fn insert<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(board_id): Path<BoardId>,
    ApiJson(request): ApiJson<InsertStateRequest>,
) -> ApiResult<(StatusCode, Json<TaskStateResponse>)> {
    let inserted = state
        .states()
        .insert(
            &caller,
            board_id,
            &request.name,
            &request.code,
            request.prev_state_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(TaskStateResponse::from(&inserted))))
}

/// `GET /task-states`
pub async fn list_all<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
) -> ApiResult<Json<Vec<TaskStateResponse>>> {
    let states = state.states().list_all().await?;
    Ok(Json(dto::list(&states)))
}

/// `GET /task-states/{id}`
pub async fn get<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<TaskStateId>,
) -> ApiResult<Json<TaskStateResponse>> {
    let found = state.states().get(id).await?;
    Ok(Json(TaskStateResponse::from(&found)))
}

/// `PUT /task-states/{id}`
pub async fn update<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<TaskStateId>,
    ApiJson(changes): ApiJson<TaskStateChanges>,
) -> ApiResult<Json<TaskStateResponse>> {
    let updated = state.states().update(&caller, id, &changes).await?;
    Ok(Json(TaskStateResponse::from(&updated)))
}

/// `DELETE /task-states/{id}`
pub async fn remove<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<TaskStateId>,
) -> ApiResult<StatusCode> {
    state.states().remove(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /task-states/{id}/move`
pub async fn reorder<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<TaskStateId>,
    ApiJson(request): ApiJson<ReorderStateRequest>,
) -> ApiResult<Json<StateSwapResponse>> {
    let swap = state.states().reorder(&caller, id, request.direction).await?;
    Ok(Json(StateSwapResponse::from(&swap)))
}
