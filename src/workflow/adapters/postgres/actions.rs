//! `PostgreSQL` audit log and notification outbox.

use super::{
    PostgresWorkflowRepository,
    models::TaskActionRow,
    schema::{notification_outbox, task_actions},
};
use crate::workflow::{
    domain::{EntityRef, TaskAction, TaskActionId, TaskId},
    ports::{
        PendingNotification, TaskActionRepository, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[async_trait]
impl TaskActionRepository for PostgresWorkflowRepository {
    async fn list_actions(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<TaskAction>> {
        self.run_blocking(move |connection| {
            task_actions::table
                .filter(task_actions::task_id.eq(task_id.into_inner()))
                .order((task_actions::created_at.asc(), task_actions::id.asc()))
                .select(TaskActionRow::as_select())
                .load::<TaskActionRow>(connection)?
                .into_iter()
                .map(TaskActionRow::into_domain)
                .collect()
        })
        .await
    }

    async fn pending_notifications(
        &self,
        limit: usize,
        max_attempts: u32,
    ) -> WorkflowRepositoryResult<Vec<PendingNotification>> {
        let row_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let attempt_cap = i32::try_from(max_attempts).unwrap_or(i32::MAX);
        self.run_blocking(move |connection| {
            let rows = notification_outbox::table
                .inner_join(task_actions::table)
                .filter(notification_outbox::dispatched_at.is_null())
                .filter(notification_outbox::attempts.lt(attempt_cap))
                .order((task_actions::created_at.asc(), task_actions::id.asc()))
                .limit(row_limit)
                .select((TaskActionRow::as_select(), notification_outbox::attempts))
                .load::<(TaskActionRow, i32)>(connection)?;
            rows.into_iter()
                .map(|(row, attempts)| {
                    Ok(PendingNotification {
                        action: row.into_domain()?,
                        attempts: u32::try_from(attempts).unwrap_or_default(),
                    })
                })
                .collect()
        })
        .await
    }

    async fn mark_notification_dispatched(
        &self,
        action_id: TaskActionId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                notification_outbox::table
                    .filter(notification_outbox::action_id.eq(action_id.into_inner())),
            )
            .set((
                notification_outbox::dispatched_at.eq(Some(at)),
                notification_outbox::updated_at.eq(at),
            ))
            .execute(connection)?;
            if updated == 0 {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Action(action_id)));
            }
            Ok(())
        })
        .await
    }

    async fn record_notification_failure(
        &self,
        action_id: TaskActionId,
        error: &str,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let message = error.to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                notification_outbox::table
                    .filter(notification_outbox::action_id.eq(action_id.into_inner())),
            )
            .set((
                notification_outbox::attempts.eq(notification_outbox::attempts + 1),
                notification_outbox::last_error.eq(Some(message)),
                notification_outbox::updated_at.eq(at),
            ))
            .execute(connection)?;
            if updated == 0 {
                return Err(WorkflowRepositoryError::NotFound(EntityRef::Action(action_id)));
            }
            Ok(())
        })
        .await
    }
}
