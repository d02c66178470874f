//! `PostgreSQL` board repository and board cascade.

use super::{
    PostgresWorkflowRepository,
    models::{BoardRow, TaskStateRow},
    schema::{account_tasks, boards, task_states, tasks},
    write_error,
};
use crate::workflow::{
    domain::{Board, BoardId, Conflict, EntityRef, ProjectId, TaskState},
    ports::{
        BoardRepository, CascadeSummary, Visibility, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

/// Trashes the live assignments of the board's live tasks, then those tasks,
/// then the board itself. The board row is locked first so task writes
/// holding it in share mode finish before the tasks are collected.
pub(super) fn trash_board_cascade(
    connection: &mut PgConnection,
    board_id: BoardId,
    at: DateTime<Utc>,
) -> WorkflowRepositoryResult<CascadeSummary> {
    let _locked: Option<Uuid> = boards::table
        .filter(boards::id.eq(board_id.into_inner()))
        .select(boards::id)
        .for_update()
        .first::<Uuid>(connection)
        .optional()?;
    let task_ids = tasks::table
        .filter(tasks::board_id.eq(board_id.into_inner()))
        .filter(tasks::deleted.eq(false))
        .select(tasks::id)
        .load::<Uuid>(connection)?;

    let assignments = diesel::update(
        account_tasks::table
            .filter(account_tasks::task_id.eq_any(&task_ids))
            .filter(account_tasks::deleted.eq(false)),
    )
    .set((
        account_tasks::deleted.eq(true),
        account_tasks::updated_at.eq(at),
    ))
    .execute(connection)?;

    let trashed_tasks = diesel::update(tasks::table.filter(tasks::id.eq_any(&task_ids)))
        .set((tasks::deleted.eq(true), tasks::updated_at.eq(at)))
        .execute(connection)?;

    let trashed_boards = diesel::update(
        boards::table
            .filter(boards::id.eq(board_id.into_inner()))
            .filter(boards::deleted.eq(false)),
    )
    .set((boards::deleted.eq(true), boards::updated_at.eq(at)))
    .execute(connection)?;

    Ok(CascadeSummary {
        boards: trashed_boards,
        tasks: trashed_tasks,
        assignments,
    })
}

#[async_trait]
impl BoardRepository for PostgresWorkflowRepository {
    async fn store_board(
        &self,
        board: &Board,
        states: &[TaskState],
    ) -> WorkflowRepositoryResult<()> {
        let row = BoardRow::from_domain(board);
        let state_rows: Vec<TaskStateRow> = states.iter().map(TaskStateRow::from_domain).collect();
        self.run_in_transaction(move |connection| {
            let name = row.name.clone();
            diesel::insert_into(boards::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| write_error(err, |_| Conflict::BoardName(name)))?;
            if !state_rows.is_empty() {
                diesel::insert_into(task_states::table)
                    .values(&state_rows)
                    .execute(connection)?;
            }
            Ok(())
        })
        .await
    }

    async fn update_board(&self, board: &Board) -> WorkflowRepositoryResult<()> {
        let row = BoardRow::from_domain(board);
        let id = board.id();
        self.run_blocking(move |connection| {
            let name = row.name.clone();
            let updated = diesel::update(
                boards::table
                    .filter(boards::id.eq(row.id))
                    .filter(boards::deleted.eq(false)),
            )
            .set(&row)
            .execute(connection)
            .map_err(|err| write_error(err, |_| Conflict::BoardName(name)))?;
            if updated == 0 {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Board(id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_board(
        &self,
        id: BoardId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Board>> {
        self.run_blocking(move |connection| {
            let row = boards::table
                .filter(boards::id.eq(id.into_inner()))
                .select(BoardRow::as_select())
                .first::<BoardRow>(connection)
                .optional()?;
            Ok(row
                .filter(|found| visibility.admits(found.deleted))
                .map(BoardRow::into_domain))
        })
        .await
    }

    async fn list_boards(&self, project_id: ProjectId) -> WorkflowRepositoryResult<Vec<Board>> {
        self.run_blocking(move |connection| {
            let rows = boards::table
                .filter(boards::project_id.eq(project_id.into_inner()))
                .filter(boards::deleted.eq(false))
                .order(boards::name.asc())
                .select(BoardRow::as_select())
                .load::<BoardRow>(connection)?;
            Ok(rows.into_iter().map(BoardRow::into_domain).collect())
        })
        .await
    }

    async fn list_all_boards(&self) -> WorkflowRepositoryResult<Vec<Board>> {
        self.run_blocking(move |connection| {
            let rows = boards::table
                .filter(boards::deleted.eq(false))
                .order((boards::project_id.asc(), boards::name.asc()))
                .select(BoardRow::as_select())
                .load::<BoardRow>(connection)?;
            Ok(rows.into_iter().map(BoardRow::into_domain).collect())
        })
        .await
    }

    async fn board_name_taken(
        &self,
        project_id: ProjectId,
        name: &str,
        except: Option<BoardId>,
    ) -> WorkflowRepositoryResult<bool> {
        let lookup_name = name.to_owned();
        self.run_blocking(move |connection| {
            let mut query = boards::table
                .filter(boards::project_id.eq(project_id.into_inner()))
                .filter(boards::name.eq(lookup_name))
                .filter(boards::deleted.eq(false))
                .select(boards::id)
                .into_boxed();
            if let Some(excluded) = except {
                query = query.filter(boards::id.ne(excluded.into_inner()));
            }
            Ok(query.first::<Uuid>(connection).optional()?.is_some())
        })
        .await
    }

    async fn trash_board(
        &self,
        id: BoardId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary> {
        self.run_in_transaction(move |connection| {
            let locked = boards::table
                .filter(boards::id.eq(id.into_inner()))
                .filter(boards::deleted.eq(false))
                .select(boards::id)
                .for_update()
                .first::<Uuid>(connection)
                .optional()?;
            if locked.is_none() {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Board(id)));
            }
            trash_board_cascade(connection, id, at)
        })
        .await
    }

    async fn trash_boards_by_project(
        &self,
        project_id: ProjectId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary> {
        self.run_in_transaction(move |connection| {
            let board_ids = boards::table
                .filter(boards::project_id.eq(project_id.into_inner()))
                .filter(boards::deleted.eq(false))
                .select(boards::id)
                .for_update()
                .load::<Uuid>(connection)?;
            let mut summary = CascadeSummary::default();
            for board_id in board_ids {
                summary = summary.merge(trash_board_cascade(
                    connection,
                    BoardId::from_uuid(board_id),
                    at,
                )?);
            }
            Ok(summary)
        })
        .await
    }
}
