//! In-memory project repository.

use super::InMemoryWorkflowStore;
use crate::workflow::{
    domain::{Conflict, EntityRef, OrganizationId, Project, ProjectId},
    ports::{
        CascadeSummary, ProjectRepository, Visibility, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

fn name_clash<'a>(
    projects: impl Iterator<Item = &'a Project>,
    organization_id: OrganizationId,
    name: &str,
    except: Option<ProjectId>,
) -> bool {
    projects
        .filter(|project| !project.is_deleted() && project.organization_id() == organization_id)
        .filter(|project| Some(project.id()) != except)
        .any(|project| project.name() == name)
}

#[async_trait]
impl ProjectRepository for InMemoryWorkflowStore {
    async fn store_project(&self, project: &Project) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        if name_clash(
            state.projects.values(),
            project.organization_id(),
            project.name(),
            None,
        ) {
            return Err(Conflict::ProjectName(project.name().to_owned()).into());
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let live = state
            .projects
            .get(&project.id())
            .is_some_and(|stored| !stored.is_deleted());
        if !live {
            return Err(WorkflowRepositoryError::NotFound(EntityRef::Project(
                project.id(),
            )));
        }
        if name_clash(
            state.projects.values(),
            project.organization_id(),
            project.name(),
            Some(project.id()),
        ) {
            return Err(Conflict::ProjectName(project.name().to_owned()).into());
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_project(
        &self,
        id: ProjectId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Project>> {
        let state = self.read()?;
        Ok(state
            .projects
            .get(&id)
            .filter(|project| visibility.admits(project.is_deleted()))
            .cloned())
    }

    async fn list_projects(
        &self,
        organization_id: OrganizationId,
    ) -> WorkflowRepositoryResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| {
                project.organization_id() == organization_id && !project.is_deleted()
            })
            .cloned()
            .collect();
        projects.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(projects)
    }

    async fn list_all_projects(&self) -> WorkflowRepositoryResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| !project.is_deleted())
            .cloned()
            .collect();
        projects.sort_by(|left, right| {
            (left.organization_id(), left.name()).cmp(&(right.organization_id(), right.name()))
        });
        Ok(projects)
    }

    async fn project_name_taken(
        &self,
        organization_id: OrganizationId,
        name: &str,
        except: Option<ProjectId>,
    ) -> WorkflowRepositoryResult<bool> {
        let state = self.read()?;
        Ok(name_clash(
            state.projects.values(),
            organization_id,
            name,
            except,
        ))
    }

    async fn trash_project(
        &self,
        id: ProjectId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary> {
        let mut state = self.write()?;
        let live = state
            .projects
            .get(&id)
            .is_some_and(|project| !project.is_deleted());
        if !live {
            return Err(WorkflowRepositoryError::NotFound(EntityRef::Project(id)));
        }

        let mut summary = CascadeSummary::default();
        for board_id in state.live_board_ids(id) {
            summary = summary.merge(state.trash_board_cascade(board_id, at));
        }
        if let Some(project) = state.projects.get_mut(&id) {
            project.mark_deleted(at);
        }
        Ok(summary)
    }
}
