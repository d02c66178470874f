//! Assignment ledger: owner-controlled assign and unassign.

use super::{
    error::{ForbiddenReason, WorkflowError, WorkflowResult},
    permissions::require_manager,
};
use crate::workflow::{
    domain::{
        AccountId, AccountTask, CallerContext, Conflict, EntityRef, Task, TaskAction,
        TaskActionType, TaskId,
    },
    ports::{OrganizationDirectory, Visibility, WorkflowRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Assigns accounts to tasks and lists assignees.
#[derive(Clone)]
pub struct AssignmentService<R, D, C>
where
    R: WorkflowRepository,
    D: OrganizationDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> AssignmentService<R, D, C>
where
    R: WorkflowRepository,
    D: OrganizationDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new assignment service.
    #[must_use]
    pub const fn new(repository: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            clock,
        }
    }

    /// Assigns `account_id` to a task owned by the caller.
    ///
    /// The account must be an employee of the caller's current organization.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when the caller does not own the
    /// task or may not manage assignments, [`WorkflowError::Directory`] when
    /// the employee lookup fails, and a conflict when the account is already
    /// assigned.
    pub async fn assign(
        &self,
        caller: &CallerContext,
        task_id: TaskId,
        account_id: AccountId,
    ) -> WorkflowResult<AccountTask> {
        self.owned_task(caller, task_id).await?;
        let organization_id = require_manager(&*self.directory, caller).await?;
        self.directory
            .employee_position(account_id, organization_id)
            .await?;
        if self.repository.is_assigned(task_id, account_id).await? {
            return Err(Conflict::Assignment {
                task_id,
                account_id,
            }
            .into());
        }

        let assignment = AccountTask::new(task_id, account_id, &*self.clock);
        let action = TaskAction::record(
            task_id,
            TaskActionType::Assigned,
            caller.account_id(),
            &*self.clock,
        )
        .with_new_value(account_id.to_string());
        self.repository
            .store_assignment(&assignment, &action)
            .await?;
        tracing::info!(task_id = %task_id, account_id = %account_id, "account assigned");
        Ok(assignment)
    }

    /// Removes the active assignment of `account_id` from a task owned by the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] when the caller does not own the
    /// task and [`WorkflowError::Repository`] with a not-found error when
    /// the account is not actively assigned.
    pub async fn unassign(
        &self,
        caller: &CallerContext,
        task_id: TaskId,
        account_id: AccountId,
    ) -> WorkflowResult<()> {
        self.owned_task(caller, task_id).await?;
        require_manager(&*self.directory, caller).await?;
        let action = TaskAction::record(
            task_id,
            TaskActionType::Unassigned,
            caller.account_id(),
            &*self.clock,
        )
        .with_old_value(account_id.to_string());
        self.repository
            .trash_assignment(task_id, account_id, &action, self.clock.utc())
            .await?;
        tracing::info!(task_id = %task_id, account_id = %account_id, "account unassigned");
        Ok(())
    }

    /// Lists the accounts actively assigned to a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the task does not exist or is
    /// trashed.
    pub async fn list_assignees(&self, task_id: TaskId) -> WorkflowResult<Vec<AccountId>> {
        self.live_task(task_id).await?;
        Ok(self.repository.list_assignees(task_id).await?)
    }

    async fn owned_task(&self, caller: &CallerContext, task_id: TaskId) -> WorkflowResult<Task> {
        let task = self.live_task(task_id).await?;
        if task.is_owned_by(caller.account_id()) {
            Ok(task)
        } else {
            Err(WorkflowError::Forbidden(ForbiddenReason::NotTaskOwner))
        }
    }

    async fn live_task(&self, task_id: TaskId) -> WorkflowResult<Task> {
        self.repository
            .find_task(task_id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Task(task_id)))
    }
}
