//! Request handlers grouped by resource.

pub mod assignments;
pub mod boards;
pub mod files;
pub mod projects;
pub mod states;
pub mod tasks;

use axum::Json;
use serde::Serialize;

/// Liveness check.
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Body of the liveness check.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Health {
    /// Always `ok` while the process serves requests.
    pub status: &'static str,
}
