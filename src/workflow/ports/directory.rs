//! Ports for the organization and user directories.

use crate::workflow::domain::{AccountId, EmployeePosition, OrganizationId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Organization and employee lookups.
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    /// Resolves the position of `account_id` within `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when the account is not an
    /// employee of the organization.
    async fn employee_position(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
    ) -> DirectoryResult<EmployeePosition>;

    /// Resolves an organization's display name.
    async fn organization_name(&self, organization_id: OrganizationId) -> DirectoryResult<String>;
}

/// User profile lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves an account's display name.
    async fn display_name(&self, account_id: AccountId) -> DirectoryResult<String>;
}

/// Errors returned by directory adapters.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The collaborator answered that the subject does not exist.
    #[error("{0} not found in directory")]
    NotFound(String),

    /// The collaborator could not be reached or answered unexpectedly.
    #[error("directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a transport or decoding failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
