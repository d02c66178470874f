//! `PostgreSQL` task state repository.
//!
//! Position changes take the board row lock and then the live state rows
//! `FOR UPDATE`, so concurrent inserts, removals and swaps on one board run
//! one after another.

use super::{
    PostgresWorkflowRepository,
    models::TaskStateRow,
    schema::{boards, task_states, tasks},
    write_error,
};
use crate::workflow::{
    domain::{
        BoardId, Conflict, EntityRef, ReorderDirection, StateOrdering, StateSwap, TaskState,
        TaskStateId,
    },
    ports::{TaskStateRepository, Visibility, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

const STATE_NAME_INDEX: &str = "idx_task_states_board_name_live";

pub(super) fn load_ordering(
    connection: &mut PgConnection,
    board_id: BoardId,
    lock: bool,
) -> WorkflowRepositoryResult<StateOrdering> {
    let query = task_states::table
        .filter(task_states::board_id.eq(board_id.into_inner()))
        .filter(task_states::deleted.eq(false))
        .order(task_states::position.asc())
        .select(TaskStateRow::as_select());
    let rows = if lock {
        query.for_update().load::<TaskStateRow>(connection)?
    } else {
        query.load::<TaskStateRow>(connection)?
    };
    let states = rows
        .into_iter()
        .map(TaskStateRow::into_domain)
        .collect::<WorkflowRepositoryResult<Vec<_>>>()?;
    Ok(StateOrdering::new(board_id, states))
}

/// Locks a live board row exclusively, for changes to its ordering.
pub(super) fn lock_board(
    connection: &mut PgConnection,
    board_id: BoardId,
) -> WorkflowRepositoryResult<()> {
    let locked = boards::table
        .filter(boards::id.eq(board_id.into_inner()))
        .filter(boards::deleted.eq(false))
        .select(boards::id)
        .for_update()
        .first::<Uuid>(connection)
        .optional()?;
    locked
        .map(|_| ())
        .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Board(board_id)))
}

/// Locks a live board row in share mode, for task writes that must see a
/// stable ordering and must not race a board delete.
pub(super) fn share_board(
    connection: &mut PgConnection,
    board_id: BoardId,
) -> WorkflowRepositoryResult<()> {
    let locked = boards::table
        .filter(boards::id.eq(board_id.into_inner()))
        .filter(boards::deleted.eq(false))
        .select(boards::id)
        .for_share()
        .first::<Uuid>(connection)
        .optional()?;
    locked
        .map(|_| ())
        .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Board(board_id)))
}

/// Resolves the board of a live state and locks it with its ordering.
fn lock_ordering_of(
    connection: &mut PgConnection,
    id: TaskStateId,
) -> WorkflowRepositoryResult<StateOrdering> {
    let board = task_states::table
        .filter(task_states::id.eq(id.into_inner()))
        .filter(task_states::deleted.eq(false))
        .select(task_states::board_id)
        .first::<Uuid>(connection)
        .optional()?
        .ok_or(WorkflowRepositoryError::NotFound(EntityRef::TaskState(id)))?;
    let board_id = BoardId::from_uuid(board);
    lock_board(connection, board_id)?;
    load_ordering(connection, board_id, true)
}

fn save_states<'a>(
    connection: &mut PgConnection,
    states: impl IntoIterator<Item = &'a TaskState>,
) -> WorkflowRepositoryResult<()> {
    for state in states {
        let row = TaskStateRow::from_domain(state);
        let name = row.name.clone();
        let code = row.code.clone();
        diesel::update(task_states::table.filter(task_states::id.eq(row.id)))
            .set(&row)
            .execute(connection)
            .map_err(|err| write_error(err, |index| label_conflict(index, name, code)))?;
    }
    Ok(())
}

fn label_conflict(index: Option<&str>, name: String, code: String) -> Conflict {
    if index == Some(STATE_NAME_INDEX) {
        Conflict::StateName(name)
    } else {
        Conflict::StateCode(code)
    }
}

#[async_trait]
impl TaskStateRepository for PostgresWorkflowRepository {
    async fn board_states(&self, board_id: BoardId) -> WorkflowRepositoryResult<StateOrdering> {
        self.run_blocking(move |connection| load_ordering(connection, board_id, false))
            .await
    }

    async fn find_task_state(
        &self,
        id: TaskStateId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<TaskState>> {
        self.run_blocking(move |connection| {
            let row = task_states::table
                .filter(task_states::id.eq(id.into_inner()))
                .select(TaskStateRow::as_select())
                .first::<TaskStateRow>(connection)
                .optional()?;
            row.filter(|found| visibility.admits(found.deleted))
                .map(TaskStateRow::into_domain)
                .transpose()
        })
        .await
    }

    async fn list_all_task_states(&self) -> WorkflowRepositoryResult<Vec<TaskState>> {
        self.run_blocking(move |connection| {
            task_states::table
                .filter(task_states::deleted.eq(false))
                .order((task_states::board_id.asc(), task_states::position.asc()))
                .select(TaskStateRow::as_select())
                .load::<TaskStateRow>(connection)?
                .into_iter()
                .map(TaskStateRow::into_domain)
                .collect()
        })
        .await
    }

    async fn insert_task_state(
        &self,
        board_id: BoardId,
        name: &str,
        code: &str,
        after: Option<TaskStateId>,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState> {
        let state_name = name.to_owned();
        let state_code = code.to_owned();
        self.run_in_transaction(move |connection| {
            lock_board(connection, board_id)?;
            let mut ordering = load_ordering(connection, board_id, true)?;
            let insertion = ordering.insert(&state_name, &state_code, after, at)?;
            let created = insertion.state;

            save_states(
                connection,
                ordering
                    .states()
                    .iter()
                    .filter(|state| state.id() != created.id()),
            )?;
            let row = TaskStateRow::from_domain(&created);
            diesel::insert_into(task_states::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    write_error(err, |index| {
                        label_conflict(index, row.name.clone(), row.code.clone())
                    })
                })?;
            Ok(created)
        })
        .await
    }

    async fn remove_task_state(
        &self,
        id: TaskStateId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState> {
        self.run_in_transaction(move |connection| {
            let mut ordering = lock_ordering_of(connection, id)?;
            let holder = tasks::table
                .filter(tasks::state_id.eq(id.into_inner()))
                .filter(tasks::deleted.eq(false))
                .select(tasks::id)
                .first::<Uuid>(connection)
                .optional()?;
            if holder.is_some() {
                return Err(Conflict::StateInUse(id).into());
            }

            let removal = ordering.remove(id, at)?;
            save_states(connection, [&removal.removed])?;
            save_states(connection, ordering.states())?;
            Ok(removal.removed)
        })
        .await
    }

    async fn rename_task_state(
        &self,
        id: TaskStateId,
        name: Option<&str>,
        code: Option<&str>,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState> {
        let new_name = name.map(str::to_owned);
        let new_code = code.map(str::to_owned);
        self.run_in_transaction(move |connection| {
            let mut ordering = lock_ordering_of(connection, id)?;
            let renamed = ordering.rename(id, new_name.as_deref(), new_code.as_deref(), at)?;
            save_states(connection, [&renamed])?;
            Ok(renamed)
        })
        .await
    }

    async fn reorder_task_state(
        &self,
        id: TaskStateId,
        direction: ReorderDirection,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<StateSwap> {
        self.run_in_transaction(move |connection| {
            let mut ordering = lock_ordering_of(connection, id)?;
            let swap = ordering.reorder(id, direction, at)?;
            save_states(connection, [&swap.moved, &swap.displaced])?;
            Ok(swap)
        })
        .await
    }
}
