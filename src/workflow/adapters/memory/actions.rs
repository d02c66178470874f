//! In-memory audit log and notification outbox.

use super::InMemoryWorkflowStore;
use crate::workflow::{
    domain::{EntityRef, TaskAction, TaskActionId, TaskId},
    ports::{
        PendingNotification, TaskActionRepository, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

impl InMemoryWorkflowStore {
    /// Returns the last delivery error recorded for an audit record.
    ///
    /// Intended for tests asserting on dispatcher bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn notification_error(
        &self,
        action_id: TaskActionId,
    ) -> WorkflowRepositoryResult<Option<String>> {
        let state = self.read()?;
        Ok(state
            .outbox
            .get(&action_id)
            .and_then(|entry| entry.last_error.clone()))
    }

    /// Returns `true` once the record's notification has been delivered.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn notification_dispatched(&self, action_id: TaskActionId) -> WorkflowRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state
            .outbox
            .get(&action_id)
            .is_some_and(|entry| entry.dispatched_at.is_some()))
    }
}

#[async_trait]
impl TaskActionRepository for InMemoryWorkflowStore {
    async fn list_actions(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<TaskAction>> {
        let state = self.read()?;
        Ok(state
            .actions
            .iter()
            .filter(|action| action.task_id() == task_id)
            .cloned()
            .collect())
    }

    async fn pending_notifications(
        &self,
        limit: usize,
        max_attempts: u32,
    ) -> WorkflowRepositoryResult<Vec<PendingNotification>> {
        let state = self.read()?;
        Ok(state
            .actions
            .iter()
            .filter_map(|action| {
                state
                    .outbox
                    .get(&action.id())
                    .filter(|entry| entry.dispatched_at.is_none() && entry.attempts < max_attempts)
                    .map(|entry| PendingNotification {
                        action: action.clone(),
                        attempts: entry.attempts,
                    })
            })
            .take(limit)
            .collect())
    }

    async fn mark_notification_dispatched(
        &self,
        action_id: TaskActionId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let entry = state
            .outbox
            .get_mut(&action_id)
            .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Action(action_id)))?;
        entry.dispatched_at = Some(at);
        Ok(())
    }

    async fn record_notification_failure(
        &self,
        action_id: TaskActionId,
        error: &str,
        _at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let entry = state
            .outbox
            .get_mut(&action_id)
            .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Action(action_id)))?;
        entry.attempts = entry.attempts.saturating_add(1);
        entry.last_error = Some(error.to_owned());
        Ok(())
    }
}
