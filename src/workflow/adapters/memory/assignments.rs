//! In-memory assignment repository.

use super::InMemoryWorkflowStore;
use crate::workflow::{
    domain::{AccountId, AccountTask, AccountTaskId, Conflict, EntityRef, TaskAction, TaskId},
    ports::{AssignmentRepository, Visibility, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

fn is_live_pair(assignment: &AccountTask, task_id: TaskId, account_id: AccountId) -> bool {
    !assignment.is_deleted()
        && assignment.task_id() == task_id
        && assignment.account_id() == account_id
}

#[async_trait]
impl AssignmentRepository for InMemoryWorkflowStore {
    async fn store_assignment(
        &self,
        assignment: &AccountTask,
        action: &TaskAction,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let task_id = assignment.task_id();
        let account_id = assignment.account_id();
        let duplicate = state
            .assignments
            .values()
            .any(|existing| is_live_pair(existing, task_id, account_id));
        if duplicate {
            return Err(Conflict::Assignment {
                task_id,
                account_id,
            }
            .into());
        }
        state.assignments.insert(assignment.id(), assignment.clone());
        state.append_action(action);
        Ok(())
    }

    async fn trash_assignment(
        &self,
        task_id: TaskId,
        account_id: AccountId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let assignment = state
            .assignments
            .values_mut()
            .find(|existing| is_live_pair(existing, task_id, account_id))
            .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Assignment {
                task_id,
                account_id,
            }))?;
        assignment.mark_deleted(at);
        state.append_action(action);
        Ok(())
    }

    async fn find_assignment(
        &self,
        id: AccountTaskId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<AccountTask>> {
        let state = self.read()?;
        Ok(state
            .assignments
            .get(&id)
            .filter(|assignment| visibility.admits(assignment.is_deleted()))
            .cloned())
    }

    async fn is_assigned(
        &self,
        task_id: TaskId,
        account_id: AccountId,
    ) -> WorkflowRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state
            .assignments
            .values()
            .any(|existing| is_live_pair(existing, task_id, account_id)))
    }

    async fn list_assignees(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<AccountId>> {
        let state = self.read()?;
        let mut assignments: Vec<&AccountTask> = state
            .assignments
            .values()
            .filter(|assignment| assignment.task_id() == task_id && !assignment.is_deleted())
            .collect();
        assignments.sort_by_key(|assignment| assignment.created_at());
        Ok(assignments.into_iter().map(AccountTask::account_id).collect())
    }

    async fn list_assignees_for_tasks(
        &self,
        task_ids: &[TaskId],
    ) -> WorkflowRepositoryResult<BTreeMap<TaskId, Vec<AccountId>>> {
        let state = self.read()?;
        let mut assignments: Vec<&AccountTask> = state
            .assignments
            .values()
            .filter(|assignment| !assignment.is_deleted() && task_ids.contains(&assignment.task_id()))
            .collect();
        assignments.sort_by_key(|assignment| assignment.created_at());

        let mut by_task: BTreeMap<TaskId, Vec<AccountId>> = BTreeMap::new();
        for assignment in assignments {
            by_task
                .entry(assignment.task_id())
                .or_default()
                .push(assignment.account_id());
        }
        Ok(by_task)
    }
}
