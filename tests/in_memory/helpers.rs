//! Shared helpers for HTTP integration tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;
use std::sync::Arc;
use taskboard::{
    api::{self, ACCOUNT_HEADER, AppState, InMemoryBackend, ORGANIZATION_HEADER},
    workflow::{
        adapters::memory::{InMemoryFileStorage, InMemoryWorkflowStore, StaticDirectory},
        domain::{AccountId, OrganizationId},
    },
};
use tower::ServiceExt;

/// Organization every test caller belongs to.
pub const ORGANIZATION: i64 = 10;
/// Account holding a management position.
pub const MANAGER: i64 = 1;
/// Account holding a regular employee position.
pub const EMPLOYEE: i64 = 2;
/// Second regular employee, used as assignee.
pub const ASSIGNEE: i64 = 4;

/// Router wired to fresh in-memory adapters.
#[fixture]
pub fn app() -> Router {
    let organization = OrganizationId::new(ORGANIZATION);
    let directory = StaticDirectory::new()
        .with_organization(organization, "Acme")
        .with_employee(AccountId::new(MANAGER), organization, "ORG_ADMIN")
        .with_employee(AccountId::new(EMPLOYEE), organization, "ORG_EMPLOYEE")
        .with_employee(AccountId::new(ASSIGNEE), organization, "ORG_EMPLOYEE");
    let state = AppState::<InMemoryBackend>::new(
        Arc::new(InMemoryWorkflowStore::new()),
        Arc::new(directory),
        Arc::new(InMemoryFileStorage::new()),
        Arc::new(DefaultClock),
    );
    api::router(state)
}

/// Response status plus decoded JSON body (`Null` when empty).
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    /// Returns a string field of the body.
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not a string.
    pub fn text(&self, pointer: &str) -> eyre::Result<String> {
        self.body
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| eyre::eyre!("missing string at {pointer} in {}", self.body))
    }
}

/// Request builder bound to one router.
pub struct Client<'a> {
    app: &'a Router,
    account: Option<i64>,
}

impl<'a> Client<'a> {
    /// Sends requests as `account` in the test organization.
    pub const fn as_account(app: &'a Router, account: i64) -> Self {
        Self {
            app,
            account: Some(account),
        }
    }

    /// Sends requests without caller headers.
    pub const fn anonymous(app: &'a Router) -> Self {
        Self { app, account: None }
    }

    /// Sends a JSON request.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be built or the body is not
    /// valid JSON.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> eyre::Result<Reply> {
        let builder = self.headers(Request::builder().method(method).uri(uri));
        let request = match body {
            Some(payload) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    /// Uploads raw bytes as a task file.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be built or the body is not
    /// valid JSON.
    pub async fn upload(&self, uri: &str, file_name: &str, bytes: &[u8]) -> eyre::Result<Reply> {
        let request = self
            .headers(Request::builder().method(Method::POST).uri(uri))
            .header("x-file-name", file_name)
            .body(Body::from(bytes.to_vec()))?;
        self.send(request).await
    }

    fn headers(&self, builder: axum::http::request::Builder) -> axum::http::request::Builder {
        match self.account {
            Some(account) => builder
                .header(ACCOUNT_HEADER, account.to_string())
                .header(ORGANIZATION_HEADER, ORGANIZATION.to_string()),
            None => builder,
        }
    }

    async fn send(&self, request: Request<Body>) -> eyre::Result<Reply> {
        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(Reply { status, body })
    }
}

/// Creates a project and a board, returning the board body.
///
/// # Errors
///
/// Returns an error when either request fails.
pub async fn create_board(app: &Router) -> eyre::Result<Value> {
    let manager = Client::as_account(app, MANAGER);
    let project = manager
        .json(
            Method::POST,
            "/projects",
            Some(serde_json::json!({"name": "Apollo", "description": "Moon program"})),
        )
        .await?;
    eyre::ensure!(
        project.status == StatusCode::CREATED,
        "project creation failed: {}",
        project.body
    );
    let project_id = project.text("/id")?;
    let board = manager
        .json(
            Method::POST,
            "/boards",
            Some(serde_json::json!({
                "name": "main",
                "title": "Main board",
                "projectId": project_id,
            })),
        )
        .await?;
    eyre::ensure!(
        board.status == StatusCode::CREATED,
        "board creation failed: {}",
        board.body
    );
    Ok(board.body)
}

/// Creates a task on `board_id` owned by `account`, returning its id.
///
/// # Errors
///
/// Returns an error when the request fails.
pub async fn create_task(app: &Router, account: i64, board_id: &str, name: &str) -> eyre::Result<String> {
    let reply = Client::as_account(app, account)
        .json(
            Method::POST,
            "/tasks",
            Some(serde_json::json!({
                "boardId": board_id,
                "name": name,
                "description": "Collect the numbers",
                "dueDate": "2026-12-31",
                "priority": 3,
            })),
        )
        .await?;
    eyre::ensure!(
        reply.status == StatusCode::CREATED,
        "task creation failed: {}",
        reply.body
    );
    reply.text("/id")
}

/// Codes of a state list body in order.
pub fn state_codes(states: &Value) -> Vec<String> {
    states
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|state| state.get("code").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
