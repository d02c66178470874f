//! Task file endpoints.

use crate::{
    api::{
        caller::{Caller, header},
        dto::{self, DeleteByKeyQuery, RemovedFilesResponse, TaskFileResponse},
        error::{ApiError, ApiResult},
        state::{AppState, WorkflowBackend},
    },
    workflow::domain::{TaskFileId, TaskId},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};

/// Header naming an uploaded file.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// `POST /tasks/files/{taskId}` with the raw file as body.
pub async fn upload<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(task_id): Path<TaskId>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TaskFileResponse>)> {
    let file_name =
        header(&headers, FILE_NAME_HEADER)?.ok_or(ApiError::InvalidHeader(FILE_NAME_HEADER))?;
    let file = state
        .files()
        .upload(&caller, task_id, file_name, body.to_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(TaskFileResponse::from(&file))))
}

/// `GET /tasks/files/task/{taskId}`
pub async fn list<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<Vec<TaskFileResponse>>> {
    let files = state.files().list(task_id).await?;
    Ok(Json(dto::list(&files)))
}

/// `DELETE /tasks/files/{id}/task/{taskId}`
pub async fn delete<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path((file_id, task_id)): Path<(TaskFileId, TaskId)>,
) -> ApiResult<StatusCode> {
    state.files().delete(&caller, file_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /tasks/files/by-key?keyName=&taskId=`
pub async fn delete_by_key<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Query(query): Query<DeleteByKeyQuery>,
) -> ApiResult<StatusCode> {
    state
        .files()
        .delete_by_key(&caller, &query.key_name, query.task_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /tasks/files/task/{taskId}`
pub async fn delete_all<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(task_id): Path<TaskId>,
) -> ApiResult<Json<RemovedFilesResponse>> {
    let removed = state.files().delete_all(&caller, task_id).await?;
    Ok(Json(RemovedFilesResponse { removed }))
}
