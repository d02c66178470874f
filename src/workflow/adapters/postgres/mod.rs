//! `PostgreSQL` adapters for workflow persistence.
//!
//! Every mutation runs inside one transaction on a pooled connection. The
//! audit record of a task change and its notification outbox row are written
//! in the same transaction as the change. Position changes lock the board row
//! and its live state rows `FOR UPDATE` before loading the ordering.

mod actions;
mod assignments;
mod boards;
mod files;
mod models;
mod projects;
pub mod schema;
mod states;
mod tasks;

use crate::workflow::{
    domain::{Conflict, TaskAction},
    ports::{WorkflowRepositoryError, WorkflowRepositoryResult},
};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use models::{OutboxRow, TaskActionRow};
use schema::{notification_outbox, task_actions};

/// `PostgreSQL` connection pool type used by workflow adapters.
pub type WorkflowPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed implementation of every workflow repository port.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowRepository {
    pool: WorkflowPgPool,
}

impl PostgresWorkflowRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> WorkflowRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkflowRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(WorkflowRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(WorkflowRepositoryError::persistence)?
    }

    async fn run_in_transaction<F, T>(&self, f: F) -> WorkflowRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkflowRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |connection| connection.transaction(f))
            .await
    }
}

impl From<DieselError> for WorkflowRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Maps unique violations to the conflict chosen by `conflict`, which
/// receives the violated constraint name.
fn write_error(
    err: DieselError,
    conflict: impl FnOnce(Option<&str>) -> Conflict,
) -> WorkflowRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
            conflict(info.constraint_name()).into()
        }
        other => WorkflowRepositoryError::persistence(other),
    }
}

/// Appends audit records and their pending outbox rows.
fn append_actions(
    connection: &mut PgConnection,
    actions: &[TaskActionRow],
) -> WorkflowRepositoryResult<()> {
    if actions.is_empty() {
        return Ok(());
    }
    diesel::insert_into(task_actions::table)
        .values(actions)
        .execute(connection)?;
    let outbox: Vec<OutboxRow> = actions.iter().map(OutboxRow::pending).collect();
    diesel::insert_into(notification_outbox::table)
        .values(&outbox)
        .execute(connection)?;
    Ok(())
}

fn action_rows(actions: &[TaskAction]) -> Vec<TaskActionRow> {
    actions.iter().map(TaskActionRow::from_domain).collect()
}
