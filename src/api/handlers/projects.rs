//! Project endpoints.

use crate::{
    api::{
        caller::Caller,
        dto::{self, CascadeResponse, CreateProjectRequest, ProjectResponse},
        error::ApiResult,
        json::ApiJson,
        state::{AppState, WorkflowBackend},
    },
    workflow::{
        domain::{OrganizationId, ProjectId},
        services::ProjectChanges,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `POST /projects`
pub async fn create<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    ApiJson(request): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .projects()
        .create(&caller, &request.name, request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// `GET /projects`
pub async fn list_all<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state.projects().list_all().await?;
    Ok(Json(dto::list(&projects)))
}

/// `GET /projects/{id}`
pub async fn get<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<ProjectId>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state.projects().get(id).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// `GET /projects/organization/{orgId}`
pub async fn list_by_organization<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Path(organization_id): Path<i64>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state
        .projects()
        .list_by_organization(OrganizationId::new(organization_id))
        .await?;
    Ok(Json(dto::list(&projects)))
}

/// `PUT /projects/{id}`
pub async fn update<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<ProjectId>,
    ApiJson(changes): ApiJson<ProjectChanges>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state.projects().update(&caller, id, changes).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// `DELETE /projects/{id}`
pub async fn delete<B: WorkflowBackend>(
    State(state): State<AppState<B>>,
    Caller(caller): Caller,
    Path(id): Path<ProjectId>,
) -> ApiResult<Json<CascadeResponse>> {
    let summary = state.projects().delete(&caller, id).await?;
    Ok(Json(summary.into()))
}
