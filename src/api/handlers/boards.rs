//! Board endpoints.

use crate::{
    api::{
        caller::Caller,
        dto::{
            self, BoardResponse, CascadeResponse, CreateBoardRequest, CreatedBoardResponse,
            TaskStateResponse,
        },
        error::ApiResult,
        json::ApiJson,
        state::{AppState, WorkflowBackend},
    },
    workflow::domain::{BoardChanges, BoardId, ProjectId},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `POST /boards`
pub async fn create<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    ApiJson(request): ApiJson<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<CreatedBoardResponse>)> {
    let (board, states) = state
        .boards()
        .create(&caller, request.project_id, &request.name, &request.title)
        .await?;
    let body = CreatedBoardResponse {
        board: BoardResponse::from(&board),
        states: dto::list(&states),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// `GET /boards/{id}`
pub async fn get<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<BoardId>,
) -> ApiResult<Json<BoardResponse>> {
    let board = state.boards().get(id).await?;
    Ok(Json(BoardResponse::from(&board)))
}

/// `GET /boards`
pub async fn list_all<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
) -> ApiResult<Json<Vec<BoardResponse>>> {
    let boards = state.boards().list_all().await?;
    Ok(Json(dto::list(&boards)))
}

/// `GET /boards/project/{projectId}`
pub async fn list_by_project<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(project_id): Path<ProjectId>,
) -> ApiResult<Json<Vec<BoardResponse>>> {
    let boards = state.boards().list_by_project(project_id).await?;
    Ok(Json(dto::list(&boards)))
}

/// `GET /boards/{id}/states`
pub async fn states<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<BoardId>,
) -> ApiResult<Json<Vec<TaskStateResponse>>> {
    let ordering = state.boards().states(id).await?;
    Ok(Json(dto::list(ordering.states())))
}

/// `PUT /boards/{id}`
pub async fn update<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<BoardId>,
    ApiJson(changes): ApiJson<BoardChanges>,
) -> ApiResult<Json<BoardResponse>> {
    let board = state.boards().update(&caller, id, &changes).await?;
    Ok(Json(BoardResponse::from(&board)))
}

/// `DELETE /boards/{id}`
pub async fn delete<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<BoardId>,
) -> ApiResult<Json<CascadeResponse>> {
    let summary = state.boards().delete(&caller, id).await?;
    Ok(Json(summary.into()))
}
