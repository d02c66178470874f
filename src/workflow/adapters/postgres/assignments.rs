//! `PostgreSQL` assignment repository.

use super::{
    PostgresWorkflowRepository, append_actions,
    models::{AccountTaskRow, TaskActionRow},
    schema::account_tasks,
    write_error,
};
use crate::workflow::{
    domain::{AccountId, AccountTask, AccountTaskId, Conflict, EntityRef, TaskAction, TaskId},
    ports::{AssignmentRepository, Visibility, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::collections::BTreeMap;
use uuid::Uuid;

#[async_trait]
impl AssignmentRepository for PostgresWorkflowRepository {
    async fn store_assignment(
        &self,
        assignment: &AccountTask,
        action: &TaskAction,
    ) -> WorkflowRepositoryResult<()> {
        let row = AccountTaskRow::from_domain(assignment);
        let actions = vec![TaskActionRow::from_domain(action)];
        let task_id = assignment.task_id();
        let account_id = assignment.account_id();
        self.run_in_transaction(move |connection| {
            diesel::insert_into(account_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    write_error(err, |_| Conflict::Assignment {
                        task_id,
                        account_id,
                    })
                })?;
            append_actions(connection, &actions)
        })
        .await
    }

    async fn trash_assignment(
        &self,
        task_id: TaskId,
        account_id: AccountId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let actions = vec![TaskActionRow::from_domain(action)];
        self.run_in_transaction(move |connection| {
            let trashed = diesel::update(
                account_tasks::table
                    .filter(account_tasks::task_id.eq(task_id.into_inner()))
                    .filter(account_tasks::account_id.eq(account_id.value()))
                    .filter(account_tasks::deleted.eq(false)),
            )
            .set((
                account_tasks::deleted.eq(true),
                account_tasks::updated_at.eq(at),
            ))
            .execute(connection)?;
            if trashed == 0 {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Assignment {
                    task_id,
                    account_id,
                }));
            }
            append_actions(connection, &actions)
        })
        .await
    }

    async fn find_assignment(
        &self,
        id: AccountTaskId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<AccountTask>> {
        self.run_blocking(move |connection| {
            let row = account_tasks::table
                .filter(account_tasks::id.eq(id.into_inner()))
                .select(AccountTaskRow::as_select())
                .first::<AccountTaskRow>(connection)
                .optional()?;
            Ok(row
                .filter(|found| visibility.admits(found.deleted))
                .map(AccountTaskRow::into_domain))
        })
        .await
    }

    async fn is_assigned(
        &self,
        task_id: TaskId,
        account_id: AccountId,
    ) -> WorkflowRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let found = account_tasks::table
                .filter(account_tasks::task_id.eq(task_id.into_inner()))
                .filter(account_tasks::account_id.eq(account_id.value()))
                .filter(account_tasks::deleted.eq(false))
                .select(account_tasks::id)
                .first::<Uuid>(connection)
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn list_assignees(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<AccountId>> {
        self.run_blocking(move |connection| {
            let accounts = account_tasks::table
                .filter(account_tasks::task_id.eq(task_id.into_inner()))
                .filter(account_tasks::deleted.eq(false))
                .order(account_tasks::created_at.asc())
                .select(account_tasks::account_id)
                .load::<i64>(connection)?;
            Ok(accounts.into_iter().map(AccountId::new).collect())
        })
        .await
    }

    async fn list_assignees_for_tasks(
        &self,
        task_ids: &[TaskId],
    ) -> WorkflowRepositoryResult<BTreeMap<TaskId, Vec<AccountId>>> {
        let ids: Vec<Uuid> = task_ids.iter().copied().map(TaskId::into_inner).collect();
        self.run_blocking(move |connection| {
            let pairs = account_tasks::table
                .filter(account_tasks::task_id.eq_any(&ids))
                .filter(account_tasks::deleted.eq(false))
                .order(account_tasks::created_at.asc())
                .select((account_tasks::task_id, account_tasks::account_id))
                .load::<(Uuid, i64)>(connection)?;
            let mut grouped: BTreeMap<TaskId, Vec<AccountId>> = BTreeMap::new();
            for (task, account) in pairs {
                grouped
                    .entry(TaskId::from_uuid(task))
                    .or_default()
                    .push(AccountId::new(account));
            }
            Ok(grouped)
        })
        .await
    }
}
