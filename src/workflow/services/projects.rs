//! Project catalogue scoped to organizations.

use super::{
    error::{WorkflowError, WorkflowResult},
    permissions::require_manager,
};
use crate::workflow::{
    domain::{CallerContext, Conflict, EntityRef, OrganizationId, Project, ProjectId},
    ports::{CascadeSummary, OrganizationDirectory, Visibility, WorkflowRepository},
};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;

/// Partial update of a project. Unset fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectChanges {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Project creation, lookup, update and cascading delete.
#[derive(Clone)]
pub struct ProjectService<R, D, C>
where
    R: WorkflowRepository,
    D: OrganizationDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> ProjectService<R, D, C>
where
    R: WorkflowRepository,
    D: OrganizationDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(repository: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            clock,
        }
    }

    /// Creates a project in the caller's current organization.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when the caller has no current
    /// organization or may not manage it, and a conflict when the name is
    /// already used in the organization.
    pub async fn create(
        &self,
        caller: &CallerContext,
        name: &str,
        description: Option<String>,
    ) -> WorkflowResult<Project> {
        let organization_id = require_manager(&*self.directory, caller).await?;
        let project = Project::new(organization_id, name, description, &*self.clock)?;
        if self
            .repository
            .project_name_taken(organization_id, project.name(), None)
            .await?
        {
            return Err(Conflict::ProjectName(project.name().to_owned()).into());
        }
        self.repository.store_project(&project).await?;
        tracing::info!(
            project_id = %project.id(),
            organization_id = %organization_id,
            "project created"
        );
        Ok(project)
    }

    /// Fetches a live project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the project does not exist or
    /// is trashed.
    pub async fn get(&self, id: ProjectId) -> WorkflowResult<Project> {
        self.repository
            .find_project(id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Project(id)))
    }

    /// Lists the live projects of an organization ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the lookup fails.
    pub async fn list_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> WorkflowResult<Vec<Project>> {
        Ok(self.repository.list_projects(organization_id).await?)
    }

    /// Lists every live project across organizations.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the lookup fails.
    pub async fn list_all(&self) -> WorkflowResult<Vec<Project>> {
        Ok(self.repository.list_all_projects().await?)
    }

    /// Renames and/or re-describes a project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown projects and a
    /// conflict when the new name is already used in the organization.
    pub async fn update(
        &self,
        caller: &CallerContext,
        id: ProjectId,
        changes: ProjectChanges,
    ) -> WorkflowResult<Project> {
        require_manager(&*self.directory, caller).await?;
        let mut project = self.get(id).await?;

        if let Some(new_name) = changes.name.as_deref() {
            let validated = Project::validate_name(new_name)?;
            if validated != project.name()
                && self
                    .repository
                    .project_name_taken(project.organization_id(), &validated, Some(id))
                    .await?
            {
                return Err(Conflict::ProjectName(validated).into());
            }
            project.rename(&validated, &*self.clock)?;
        }
        if let Some(description) = changes.description {
            project.describe(description, &*self.clock);
        }

        self.repository.update_project(&project).await?;
        Ok(project)
    }

    /// Trashes a project with its boards, their tasks and assignments.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown projects.
    pub async fn delete(
        &self,
        caller: &CallerContext,
        id: ProjectId,
    ) -> WorkflowResult<CascadeSummary> {
        require_manager(&*self.directory, caller).await?;
        self.get(id).await?;
        let summary = self.repository.trash_project(id, self.clock.utc()).await?;
        tracing::info!(
            project_id = %id,
            boards = summary.boards,
            tasks = summary.tasks,
            assignments = summary.assignments,
            "project deleted"
        );
        Ok(summary)
    }
}
