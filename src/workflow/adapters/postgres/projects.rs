//! `PostgreSQL` project repository.

use super::{
    PostgresWorkflowRepository, boards::trash_board_cascade, models::ProjectRow,
    schema::{boards, projects},
    write_error,
};
use crate::workflow::{
    domain::{BoardId, Conflict, EntityRef, OrganizationId, Project, ProjectId},
    ports::{
        CascadeSummary, ProjectRepository, Visibility, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[async_trait]
impl ProjectRepository for PostgresWorkflowRepository {
    async fn store_project(&self, project: &Project) -> WorkflowRepositoryResult<()> {
        let row = ProjectRow::from_domain(project);
        self.run_blocking(move |connection| {
            let name = row.name.clone();
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| write_error(err, |_| Conflict::ProjectName(name)))?;
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> WorkflowRepositoryResult<()> {
        let row = ProjectRow::from_domain(project);
        let id = project.id();
        self.run_blocking(move |connection| {
            let name = row.name.clone();
            let updated = diesel::update(
                projects::table
                    .filter(projects::id.eq(row.id))
                    .filter(projects::deleted.eq(false)),
            )
            .set(&row)
            .execute(connection)
            .map_err(|err| write_error(err, |_| Conflict::ProjectName(name)))?;
            if updated == 0 {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Project(id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_project(
        &self,
        id: ProjectId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            Ok(row
                .filter(|found| visibility.admits(found.deleted))
                .map(ProjectRow::into_domain))
        })
        .await
    }

    async fn list_projects(
        &self,
        organization_id: OrganizationId,
    ) -> WorkflowRepositoryResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::organization_id.eq(organization_id.value()))
                .filter(projects::deleted.eq(false))
                .order(projects::name.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)?;
            Ok(rows.into_iter().map(ProjectRow::into_domain).collect())
        })
        .await
    }

    async fn list_all_projects(&self) -> WorkflowRepositoryResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::deleted.eq(false))
                .order((projects::organization_id.asc(), projects::name.asc()))
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)?;
            Ok(rows.into_iter().map(ProjectRow::into_domain).collect())
        })
        .await
    }

    async fn project_name_taken(
        &self,
        organization_id: OrganizationId,
        name: &str,
        except: Option<ProjectId>,
    ) -> WorkflowRepositoryResult<bool> {
        let lookup_name = name.to_owned();
        self.run_blocking(move |connection| {
            let mut query = projects::table
                .filter(projects::organization_id.eq(organization_id.value()))
                .filter(projects::name.eq(lookup_name))
                .filter(projects::deleted.eq(false))
                .select(projects::id)
                .into_boxed();
            if let Some(excluded) = except {
                query = query.filter(projects::id.ne(excluded.into_inner()));
            }
            let found = query.first::<Uuid>(connection).optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn trash_project(
        &self,
        id: ProjectId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary> {
        self.run_in_transaction(move |connection| {
            let locked = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .filter(projects::deleted.eq(false))
                .select(projects::id)
                .for_update()
                .first::<Uuid>(connection)
                .optional()?;
            if locked.is_none() {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Project(id)));
            }

            let board_ids = boards::table
                .filter(boards::project_id.eq(id.into_inner()))
                .filter(boards::deleted.eq(false))
                .select(boards::id)
                .load::<Uuid>(connection)?;
            let mut summary = CascadeSummary::default();
            for board_id in board_ids {
                summary = summary.merge(trash_board_cascade(
                    connection,
                    BoardId::from_uuid(board_id),
                    at,
                )?);
            }

            diesel::update(projects::table.filter(projects::id.eq(id.into_inner())))
                .set((projects::deleted.eq(true), projects::updated_at.eq(at)))
                .execute(connection)?;
            Ok(summary)
        })
        .await
    }
}
