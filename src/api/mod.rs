//! HTTP surface of the workflow engine.
//!
//! Handlers translate JSON bodies and path parameters into service calls and
//! map [`WorkflowError`](crate::workflow::services::WorkflowError) onto
//! stable status codes through [`ApiError`]. The caller identity is read
//! from gateway headers by the [`Caller`] extractor and request bodies go
//! through [`ApiJson`].

pub mod caller;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod json;
pub mod state;

pub use caller::{ACCOUNT_HEADER, Caller, ORGANIZATION_HEADER, ROLE_HEADER};
pub use error::{ApiError, ApiResult, status_for};
pub use json::ApiJson;
pub use state::{AppState, InMemoryBackend, PostgresBackend, WorkflowBackend};

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use handlers::{assignments, boards, files, projects, states, tasks};
use tower_http::trace::TraceLayer;

/// Builds the router serving every workflow endpoint.
///
/// Routes sharing a path position share a parameter name, so
/// `POST /task-states/:id` receives a board id while the other methods on
/// that path receive a state id.
pub fn router<B: WorkflowBackend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/projects",
            get(projects::list_all::<B>).post(projects::create::<B>),
        )
        .route(
            "/projects/:id",
            get(projects::get::<B>)
                .put(projects::update::<B>)
                .delete(projects::delete::<B>),
        )
        .route(
            "/projects/organization/:organization_id",
            get(projects::list_by_organization::<B>),
        )
        .route(
            "/boards",
            get(boards::list_all::<B>).post(boards::create::<B>),
        )
        .route(
            "/boards/:id",
            get(boards::get::<B>)
                .put(boards::update::<B>)
                .delete(boards::delete::<B>),
        )
        .route("/boards/:id/states", get(boards::states::<B>))
        .route(
            "/boards/project/:project_id",
            get(boards::list_by_project::<B>),
        )
        .route("/task-states", get(states::list_all::<B>))
        .route(
            "/task-states/:id",
            post(states::insert::<B>)
                .get(states::get::<B>)
                .put(states::update::<B>)
                .delete(states::remove::<B>),
        )
        .route("/task-states/:id/move", put(states::reorder::<B>))
        .route("/tasks", post(tasks::create::<B>))
        .route(
            "/tasks/:id",
            get(tasks::get::<B>)
                .put(tasks::update::<B>)
                .delete(tasks::delete::<B>),
        )
        .route("/tasks/:id/actions", get(tasks::history::<B>))
        .route("/tasks/:id/move", put(tasks::move_task::<B>))
        .route("/tasks/:id/state", put(tasks::change_state::<B>))
        .route("/tasks/board/:board_id", get(tasks::list_by_board::<B>))
        .route("/account-tasks", post(assignments::assign::<B>))
        .route("/account-tasks/:task_id", get(assignments::list::<B>))
        .route(
            "/account-tasks/:task_id/:account_id",
            delete(assignments::unassign::<B>),
        )
        .route("/tasks/files/by-key", delete(files::delete_by_key::<B>))
        .route(
            "/tasks/files/task/:task_id",
            get(files::list::<B>).delete(files::delete_all::<B>),
        )
        .route("/tasks/files/:id", post(files::upload::<B>))
        .route("/tasks/files/:id/task/:task_id", delete(files::delete::<B>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
