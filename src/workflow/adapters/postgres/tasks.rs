//! `PostgreSQL` task repository.

use super::{
    PostgresWorkflowRepository, action_rows, append_actions,
    models::{TaskActionRow, TaskRow},
    schema::{account_tasks, task_states, tasks},
    states::{load_ordering, share_board},
    write_error,
};
use crate::workflow::{
    domain::{
        AccountId, BoardId, Conflict, EntityRef, Task, TaskAction, TaskId, TaskStateId,
        TransitionTarget,
    },
    ports::{
        TaskRepository, TransitionedTask, Visibility, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

#[async_trait]
impl TaskRepository for PostgresWorkflowRepository {
    async fn store_task(&self, task: &Task, action: &TaskAction) -> WorkflowRepositoryResult<()> {
        let row = TaskRow::from_domain(task);
        let board_id = task.board_id();
        let actions = vec![TaskActionRow::from_domain(action)];
        self.run_in_transaction(move |connection| {
            share_board(connection, board_id)?;
            let initial = task_states::table
                .filter(task_states::id.eq(row.state_id))
                .filter(task_states::board_id.eq(row.board_id))
                .filter(task_states::deleted.eq(false))
                .select(task_states::id)
                .first::<Uuid>(connection)
                .optional()?;
            if initial.is_none() {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::TaskState(
                    TaskStateId::from_uuid(row.state_id),
                )));
            }

            let name = row.name.clone();
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| write_error(err, |_| Conflict::TaskName(name)))?;
            append_actions(connection, &actions)
        })
        .await
    }

    async fn update_task(
        &self,
        task: &Task,
        actions: &[TaskAction],
    ) -> WorkflowRepositoryResult<()> {
        let row = TaskRow::from_domain(task);
        let id = task.id();
        let records = action_rows(actions);
        self.run_in_transaction(move |connection| {
            let name = row.name.clone();
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(row.id))
                    .filter(tasks::deleted.eq(false)),
            )
            .set((
                tasks::name.eq(&row.name),
                tasks::description.eq(&row.description),
                tasks::due_date.eq(row.due_date),
                tasks::priority.eq(row.priority),
                tasks::updated_at.eq(row.updated_at),
            ))
            .execute(connection)
            .map_err(|err| write_error(err, |_| Conflict::TaskName(name)))?;
            if updated == 0 {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Task(id)));
            }
            append_actions(connection, &records)
        })
        .await
    }

    async fn transition_task(
        &self,
        id: TaskId,
        target: &TransitionTarget,
        actor_id: AccountId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TransitionedTask> {
        let wanted = target.clone();
        self.run_in_transaction(move |connection| {
            let board = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::deleted.eq(false))
                .select(tasks::board_id)
                .first::<Uuid>(connection)
                .optional()?
                .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Task(id)))?;
            let board_id = BoardId::from_uuid(board);
            share_board(connection, board_id)?;

            let mut task = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::deleted.eq(false))
                .select(TaskRow::as_select())
                .for_update()
                .first::<TaskRow>(connection)
                .optional()?
                .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Task(id)))?
                .into_domain()?;
            let ordering = load_ordering(connection, board_id, false)?;
            let transition = ordering.resolve_transition(task.state_id(), &wanted)?;
            let action = task.apply_transition(&transition, actor_id, at)?;

            diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set((
                    tasks::state_id.eq(task.state_id().into_inner()),
                    tasks::updated_at.eq(task.updated_at()),
                ))
                .execute(connection)?;
            append_actions(connection, &[TaskActionRow::from_domain(&action)])?;
            Ok(TransitionedTask { task, action })
        })
        .await
    }

    async fn find_task(
        &self,
        id: TaskId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.filter(|found| visibility.admits(found.deleted))
                .map(TaskRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn list_tasks(&self, board_id: BoardId) -> WorkflowRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            tasks::table
                .filter(tasks::board_id.eq(board_id.into_inner()))
                .filter(tasks::deleted.eq(false))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(TaskRow::into_domain)
                .collect()
        })
        .await
    }

    async fn task_name_taken(
        &self,
        board_id: BoardId,
        name: &str,
        except: Option<TaskId>,
    ) -> WorkflowRepositoryResult<bool> {
        let lookup_name = name.to_owned();
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .filter(tasks::board_id.eq(board_id.into_inner()))
                .filter(tasks::name.eq(lookup_name))
                .filter(tasks::deleted.eq(false))
                .select(tasks::id)
                .into_boxed();
            if let Some(excluded) = except {
                query = query.filter(tasks::id.ne(excluded.into_inner()));
            }
            Ok(query.first::<Uuid>(connection).optional()?.is_some())
        })
        .await
    }

    async fn trash_task(
        &self,
        id: TaskId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<usize> {
        let actions = vec![TaskActionRow::from_domain(action)];
        self.run_in_transaction(move |connection| {
            let locked = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::deleted.eq(false))
                .select(tasks::id)
                .for_update()
                .first::<Uuid>(connection)
                .optional()?;
            if locked.is_none() {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Task(id)));
            }

            let trashed = diesel::update(
                account_tasks::table
                    .filter(account_tasks::task_id.eq(id.into_inner()))
                    .filter(account_tasks::deleted.eq(false)),
            )
            .set((
                account_tasks::deleted.eq(true),
                account_tasks::updated_at.eq(at),
            ))
            .execute(connection)?;
            append_actions(connection, &actions)?;
            diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set((tasks::deleted.eq(true), tasks::updated_at.eq(at)))
                .execute(connection)?;
            Ok(trashed)
        })
        .await
    }
}
