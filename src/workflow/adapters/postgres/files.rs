//! `PostgreSQL` task file repository.

use super::{
    PostgresWorkflowRepository, append_actions,
    models::{TaskActionRow, TaskFileRow},
    schema::task_files,
};
use crate::workflow::{
    domain::{EntityRef, TaskAction, TaskFile, TaskFileId, TaskId},
    ports::{TaskFileRepository, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[async_trait]
impl TaskFileRepository for PostgresWorkflowRepository {
    async fn store_task_file(
        &self,
        file: &TaskFile,
        action: &TaskAction,
    ) -> WorkflowRepositoryResult<()> {
        let row = TaskFileRow::from_domain(file);
        let actions = vec![TaskActionRow::from_domain(action)];
        self.run_in_transaction(move |connection| {
            diesel::insert_into(task_files::table)
                .values(&row)
                .execute(connection)?;
            append_actions(connection, &actions)
        })
        .await
    }

    async fn find_task_file(&self, id: TaskFileId) -> WorkflowRepositoryResult<Option<TaskFile>> {
        self.run_blocking(move |connection| {
            let row = task_files::table
                .filter(task_files::id.eq(id.into_inner()))
                .filter(task_files::deleted.eq(false))
                .select(TaskFileRow::as_select())
                .first::<TaskFileRow>(connection)
                .optional()?;
            Ok(row.map(TaskFileRow::into_domain))
        })
        .await
    }

    async fn find_task_file_by_key(
        &self,
        task_id: TaskId,
        key_name: &str,
    ) -> WorkflowRepositoryResult<Option<TaskFile>> {
        let lookup_key = key_name.to_owned();
        self.run_blocking(move |connection| {
            let row = task_files::table
                .filter(task_files::task_id.eq(task_id.into_inner()))
                .filter(task_files::key_name.eq(lookup_key))
                .filter(task_files::deleted.eq(false))
                .select(TaskFileRow::as_select())
                .first::<TaskFileRow>(connection)
                .optional()?;
            Ok(row.map(TaskFileRow::into_domain))
        })
        .await
    }

    async fn list_task_files(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<TaskFile>> {
        self.run_blocking(move |connection| {
            let rows = task_files::table
                .filter(task_files::task_id.eq(task_id.into_inner()))
                .filter(task_files::deleted.eq(false))
                .order(task_files::created_at.asc())
                .select(TaskFileRow::as_select())
                .load::<TaskFileRow>(connection)?;
            Ok(rows.into_iter().map(TaskFileRow::into_domain).collect())
        })
        .await
    }

    async fn trash_task_file(
        &self,
        id: TaskFileId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let actions = vec![TaskActionRow::from_domain(action)];
        self.run_in_transaction(move |connection| {
            let trashed = diesel::update(
                task_files::table
                    .filter(task_files::id.eq(id.into_inner()))
                    .filter(task_files::deleted.eq(false)),
            )
            .set((task_files::deleted.eq(true), task_files::updated_at.eq(at)))
            .execute(connection)?;
            if trashed == 0 {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::TaskFile(id)));
            }
            append_actions(connection, &actions)
        })
        .await
    }

    async fn trash_task_files(
        &self,
        task_id: TaskId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<usize> {
        let actions = vec![TaskActionRow::from_domain(action)];
        self.run_in_transaction(move |connection| {
            let trashed = diesel::update(
                task_files::table
                    .filter(task_files::task_id.eq(task_id.into_inner()))
                    .filter(task_files::deleted.eq(false)),
            )
            .set((task_files::deleted.eq(true), task_files::updated_at.eq(at)))
            .execute(connection)?;
            append_actions(connection, &actions)?;
            Ok(trashed)
        })
        .await
    }
}
