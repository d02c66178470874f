//! Service-level errors for workflow operations.

use crate::workflow::{
    domain::{Conflict, EntityRef, ErrorKind, WorkflowDomainError},
    ports::{DirectoryError, FileStorageError, WorkflowRepositoryError},
};
use thiserror::Error;

/// Why the caller may not perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ForbiddenReason {
    /// Only the task owner may do this.
    #[error("only the task owner may perform this operation")]
    NotTaskOwner,
    /// Only the task owner or an active assignee may do this.
    #[error("only the task owner or an assignee may change the task state")]
    NotOwnerOrAssignee,
    /// The caller's employee position does not allow management operations.
    #[error("the caller's position does not allow this operation")]
    InsufficientPosition,
    /// The caller is not an employee of the current organization.
    #[error("the caller is not an employee of the current organization")]
    NotAnEmployee,
    /// The caller has no current organization.
    #[error("the caller has no current organization")]
    MissingOrganization,
}

impl ForbiddenReason {
    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotTaskOwner => "NOT_TASK_OWNER",
            Self::NotOwnerOrAssignee => "NOT_OWNER_OR_ASSIGNEE",
            Self::InsufficientPosition => "INSUFFICIENT_POSITION",
            Self::NotAnEmployee => "NOT_AN_EMPLOYEE",
            Self::MissingOrganization => "ORGANIZATION_NOT_FOUND",
        }
    }
}

/// Errors returned by workflow services.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// Input validation or a workflow rule failed.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// Persistence rejected or failed the operation.
    #[error(transparent)]
    Repository(#[from] WorkflowRepositoryError),

    /// The addressed entity does not exist or is trashed.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// The caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),

    /// The organization or user directory failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The file-storage service failed.
    #[error(transparent)]
    FileStorage(#[from] FileStorageError),
}

impl From<Conflict> for WorkflowError {
    fn from(conflict: Conflict) -> Self {
        Self::Domain(conflict.into())
    }
}

impl WorkflowError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => err.kind(),
            Self::Repository(err) => err.kind(),
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Directory(_) | Self::FileStorage(_) => ErrorKind::Upstream,
        }
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.code(),
            Self::Repository(err) => err.code(),
            Self::NotFound(entity) => entity.code(),
            Self::Forbidden(reason) => reason.code(),
            Self::Directory(_) => "DIRECTORY_UNAVAILABLE",
            Self::FileStorage(_) => "FILE_STORAGE_UNAVAILABLE",
        }
    }
}

/// Result type for workflow service operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
