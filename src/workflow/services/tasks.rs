//! Task lifecycle and state transitions along the board ordering.

use super::error::{ForbiddenReason, WorkflowError, WorkflowResult};
use crate::workflow::{
    domain::{
        AccountId, BoardId, CallerContext, Conflict, EntityRef, INITIAL_STATE_CODE,
        MoveDirection, NewTask, Priority, StateOrdering, Task, TaskAction, TaskActionType,
        TaskChanges, TaskId, TaskState, TransitionTarget, WorkflowDomainError,
    },
    ports::{Visibility, WorkflowRepository, WorkflowRepositoryError},
};
use chrono::NaiveDate;
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;

/// Fields supplied when creating a task. The caller becomes the owner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Board the task is created on.
    pub board_id: BoardId,
    /// Task name, unique on the board.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Priority between one and five.
    pub priority: Priority,
}

/// A task together with its active assignees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    /// The task.
    pub task: Task,
    /// Accounts actively assigned to the task.
    pub assignees: Vec<AccountId>,
}

/// Creates, moves, updates and deletes tasks.
#[derive(Clone)]
pub struct TaskService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a task owned by the caller in the board's `NEW` state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the board is missing,
    /// [`WorkflowDomainError::StateCodeNotFound`] when the board has no
    /// initial state, and a conflict when the name is already used on the
    /// board.
    pub async fn create(&self, caller: &CallerContext, draft: TaskDraft) -> WorkflowResult<Task> {
        self.repository
            .find_board(draft.board_id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Board(draft.board_id)))?;

        let ordering = self.repository.board_states(draft.board_id).await?;
        let initial = state_by_code(&ordering, INITIAL_STATE_CODE)?;
        let input = NewTask {
            board_id: draft.board_id,
            name: draft.name,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            owner_id: caller.account_id(),
        };
        let task = Task::new(&input, initial, &*self.clock)?;
        if self
            .repository
            .task_name_taken(task.board_id(), task.name(), None)
            .await?
        {
            return Err(Conflict::TaskName(task.name().to_owned()).into());
        }

        let action = TaskAction::record(
            task.id(),
            TaskActionType::Created,
            caller.account_id(),
            &*self.clock,
        )
        .with_comment("New Task created");
        self.repository.store_task(&task, &action).await?;
        tracing::info!(
            task_id = %task.id(),
            board_id = %task.board_id(),
            owner_id = %task.owner_id(),
            "task created"
        );
        Ok(task)
    }

    /// Fetches a live task with its assignees.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the task does not exist or is
    /// trashed.
    pub async fn get(&self, id: TaskId) -> WorkflowResult<TaskView> {
        let task = self.live_task(id).await?;
        let assignees = self.repository.list_assignees(id).await?;
        Ok(TaskView { task, assignees })
    }

    /// Lists the live tasks of a board with their assignees.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the board is missing.
    pub async fn list_by_board(&self, board_id: BoardId) -> WorkflowResult<Vec<TaskView>> {
        self.repository
            .find_board(board_id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Board(board_id)))?;
        let tasks = self.repository.list_tasks(board_id).await?;
        let ids: Vec<TaskId> = tasks.iter().map(Task::id).collect();
        let mut assignees = self.repository.list_assignees_for_tasks(&ids).await?;
        Ok(tasks
            .into_iter()
            .map(|task| TaskView {
                assignees: assignees.remove(&task.id()).unwrap_or_default(),
                task,
            })
            .collect())
    }

    /// Returns every audit record of a task, oldest first. Trashed tasks keep
    /// their history.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the task never existed.
    pub async fn history(&self, id: TaskId) -> WorkflowResult<Vec<TaskAction>> {
        self.repository
            .find_task(id, Visibility::IncludeArchived)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Task(id)))?;
        Ok(self.repository.list_actions(id).await?)
    }

    /// Moves a task one state forward or backward.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::MoveOutOfBounds`] at the first or last
    /// state; the task is left unchanged.
    pub async fn move_task(
        &self,
        caller: &CallerContext,
        id: TaskId,
        direction: MoveDirection,
    ) -> WorkflowResult<Task> {
        self.transition(caller, id, &TransitionTarget::Step(direction))
            .await
    }

    /// Puts a task directly into the state with `code`, skipping any states
    /// in between.
    ///
    /// Only the owner or an active assignee may do this. The recorded action
    /// is `MOVED_FORWARD` or `MOVED_BACKWARD` depending on the relative
    /// position, or `UPDATED` when the task already sits in the target.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] for other callers and
    /// [`WorkflowDomainError::StateCodeNotFound`] for unknown codes.
    pub async fn change_state_by_code(
        &self,
        caller: &CallerContext,
        id: TaskId,
        code: &str,
    ) -> WorkflowResult<Task> {
        let task = self.live_task(id).await?;
        let account_id = caller.account_id();
        if !task.is_owned_by(account_id) && !self.repository.is_assigned(id, account_id).await? {
            return Err(WorkflowError::Forbidden(ForbiddenReason::NotOwnerOrAssignee));
        }
        self.transition(caller, id, &TransitionTarget::Code(code.to_owned()))
            .await
    }

    /// Applies a partial update, recording one `UPDATED` action per changed
    /// field.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed fields and a conflict when
    /// the new name is already used on the board.
    pub async fn update(
        &self,
        caller: &CallerContext,
        id: TaskId,
        changes: &TaskChanges,
    ) -> WorkflowResult<Task> {
        let mut task = self.live_task(id).await?;
        let diff = task.apply_changes(changes, &*self.clock)?;
        if diff.is_empty() {
            return Ok(task);
        }
        if diff.iter().any(|change| change.field == "name")
            && self
                .repository
                .task_name_taken(task.board_id(), task.name(), Some(id))
                .await?
        {
            return Err(Conflict::TaskName(task.name().to_owned()).into());
        }

        let actions: Vec<TaskAction> = diff
            .iter()
            .map(|change| {
                TaskAction::record(id, TaskActionType::Updated, caller.account_id(), &*self.clock)
                    .with_old_value(change.old_value())
                    .with_new_value(change.new_value())
            })
            .collect();
        self.repository.update_task(&task, &actions).await?;
        tracing::debug!(task_id = %id, fields = diff.len(), "task updated");
        Ok(task)
    }

    /// Trashes a task after its active assignments, recording `DELETED`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the task does not exist or is
    /// already trashed.
    pub async fn delete(&self, caller: &CallerContext, id: TaskId) -> WorkflowResult<()> {
        self.live_task(id).await?;
        let action = TaskAction::record(id, TaskActionType::Deleted, caller.account_id(), &*self.clock)
            .with_comment("Task deleted");
        let assignments = self
            .repository
            .trash_task(id, &action, self.clock.utc())
            .await?;
        tracing::info!(task_id = %id, assignments, "task deleted");
        Ok(())
    }

    async fn live_task(&self, id: TaskId) -> WorkflowResult<Task> {
        self.repository
            .find_task(id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Task(id)))
    }

    async fn transition(
        &self,
        caller: &CallerContext,
        id: TaskId,
        target: &TransitionTarget,
    ) -> WorkflowResult<Task> {
        let moved = self
            .repository
            .transition_task(id, target, caller.account_id(), self.clock.utc())
            .await
            .map_err(|err| match err {
                WorkflowRepositoryError::Domain(rule) => WorkflowError::Domain(rule),
                other => WorkflowError::Repository(other),
            })?;
        tracing::debug!(
            task_id = %id,
            from = moved.action.old_value(),
            to = moved.action.new_value(),
            action = %moved.action.action_type(),
            "task state changed"
        );
        Ok(moved.task)
    }
}

fn state_by_code<'a>(ordering: &'a StateOrdering, code: &str) -> WorkflowResult<&'a TaskState> {
    ordering.by_code(code).ok_or_else(|| {
        WorkflowDomainError::StateCodeNotFound {
            board_id: ordering.board_id(),
            code: code.to_owned(),
        }
        .into()
    })
}
