//! Mapping of service errors onto HTTP responses.

use crate::workflow::{domain::ErrorKind, services::WorkflowError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A workflow operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The request carries no caller identity.
    #[error("missing {0} header")]
    MissingCaller(&'static str),

    /// A header is present but malformed or a required header is absent.
    #[error("invalid or missing {0} header")]
    InvalidHeader(&'static str),

    /// The JSON body is missing, malformed or does not fit the payload type.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    kind: &'a str,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Workflow(err) => status_for(err.kind()),
            Self::MissingCaller(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidHeader(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Workflow(err) => err.code(),
            Self::MissingCaller(_) => "MISSING_CALLER",
            Self::InvalidHeader(_) => "INVALID_HEADER",
            Self::InvalidBody(_) => "INVALID_BODY",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Workflow(err) => err.kind().as_str(),
            Self::MissingCaller(_) => "unauthenticated",
            Self::InvalidHeader(_) | Self::InvalidBody(_) => ErrorKind::BadRequest.as_str(),
        }
    }
}

/// Returns the HTTP status for an error classification.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, code = self.code(), "request failed");
            "internal server error".to_owned()
        } else {
            tracing::debug!(error = %self, code = self.code(), "request rejected");
            self.to_string()
        };
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code: self.code(),
                kind: self.kind(),
                message,
            },
        };
        (status, Json(envelope)).into_response()
    }
}
