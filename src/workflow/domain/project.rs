//! Project aggregate scoped to an organization.

use super::fields::{PROJECT_NAME_MAX, required_text};
use super::{OrganizationId, ProjectId, WorkflowDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A project groups boards for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    organization_id: OrganizationId,
    name: String,
    description: Option<String>,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted identifier.
    pub id: ProjectId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Project name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project for an organization.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name is empty or too long.
    pub fn new(
        organization_id: OrganizationId,
        name: &str,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Result<Self, WorkflowDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            organization_id,
            name: required_text("project name", name, PROJECT_NAME_MAX)?,
            description,
            deleted: false,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            organization_id: data.organization_id,
            name: data.name,
            description: data.description,
            deleted: data.deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns `true` once the project has been trashed.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name is empty or too long.
    pub fn rename(&mut self, name: &str, clock: &impl Clock) -> Result<(), WorkflowDomainError> {
        self.name = required_text("project name", name, PROJECT_NAME_MAX)?;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Replaces the description.
    pub fn describe(&mut self, description: String, clock: &impl Clock) {
        self.description = Some(description);
        self.updated_at = clock.utc();
    }

    pub(crate) const fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.updated_at = now;
    }

    /// Checks a candidate name without mutating the project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name is empty or too long.
    pub fn validate_name(name: &str) -> Result<String, WorkflowDomainError> {
        required_text("project name", name, PROJECT_NAME_MAX)
    }
}
