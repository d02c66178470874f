//! Task state management on top of the board ordering.

use super::error::{WorkflowError, WorkflowResult};
use crate::workflow::{
    domain::{
        BoardId, CallerContext, EntityRef, ReorderDirection, StateSwap, TaskState, TaskStateId,
        WorkflowDomainError,
    },
    ports::{Visibility, WorkflowRepository},
};
use mockable::Clock;
use serde::Deserialize;
use std::sync::Arc;

/// Partial rename of a task state. Unset fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStateChanges {
    /// New display name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
}

/// Inserts, renames, removes and reorders the task states of a board.
///
/// Any authenticated caller may change a board's states; the management
/// position check applies to projects, boards and assignments only.
#[derive(Clone)]
pub struct TaskStateService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskStateService<R, C>
where
    R: WorkflowRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task state service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Inserts a state right after `after`, or at the head of the board when
    /// `after` is `None`. Later states shift up by one.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for an unknown board or
    /// predecessor, [`WorkflowDomainError::StateOnAnotherBoard`] when the
    /// predecessor lives on a different board, and a conflict when the name
    /// or code is taken.
    pub async fn insert(
        &self,
        caller: &CallerContext,
        board_id: BoardId,
        name: &str,
        code: &str,
        after: Option<TaskStateId>,
    ) -> WorkflowResult<TaskState> {
        self.repository
            .find_board(board_id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Board(board_id)))?;
        if let Some(previous_id) = after {
            let previous = self.get(previous_id).await?;
            if previous.board_id() != board_id {
                return Err(WorkflowDomainError::StateOnAnotherBoard {
                    state_id: previous_id,
                    board_id,
                }
                .into());
            }
        }

        let state = self
            .repository
            .insert_task_state(board_id, name, code, after, self.clock.utc())
            .await?;
        tracing::info!(
            account_id = %caller.account_id(),
            board_id = %board_id,
            state_id = %state.id(),
            code = state.code(),
            position = %state.position(),
            "task state inserted"
        );
        Ok(state)
    }

    /// Fetches a live state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the state does not exist or
    /// is trashed.
    pub async fn get(&self, id: TaskStateId) -> WorkflowResult<TaskState> {
        self.repository
            .find_task_state(id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::TaskState(id)))
    }

    /// Lists every live state, board by board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the lookup fails.
    pub async fn list_all(&self) -> WorkflowResult<Vec<TaskState>> {
        Ok(self.repository.list_all_task_states().await?)
    }

    /// Renames a state and/or changes its code.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown states and a conflict
    /// when the new name or code is taken on the board.
    pub async fn update(
        &self,
        caller: &CallerContext,
        id: TaskStateId,
        changes: &TaskStateChanges,
    ) -> WorkflowResult<TaskState> {
        let renamed = self
            .repository
            .rename_task_state(
                id,
                changes.name.as_deref(),
                changes.code.as_deref(),
                self.clock.utc(),
            )
            .await?;
        tracing::debug!(
            account_id = %caller.account_id(),
            state_id = %id,
            code = renamed.code(),
            "task state renamed"
        );
        Ok(renamed)
    }

    /// Trashes a state and closes the position gap.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown states and a conflict
    /// when live tasks still sit in the state.
    pub async fn remove(
        &self,
        caller: &CallerContext,
        id: TaskStateId,
    ) -> WorkflowResult<TaskState> {
        let removed = self
            .repository
            .remove_task_state(id, self.clock.utc())
            .await?;
        tracing::info!(
            account_id = %caller.account_id(),
            board_id = %removed.board_id(),
            state_id = %id,
            "task state removed"
        );
        Ok(removed)
    }

    /// Swaps a state with its neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown states and
    /// [`WorkflowDomainError::ReorderOutOfBounds`] at the board boundary.
    pub async fn reorder(
        &self,
        caller: &CallerContext,
        id: TaskStateId,
        direction: ReorderDirection,
    ) -> WorkflowResult<StateSwap> {
        let swap = self
            .repository
            .reorder_task_state(id, direction, self.clock.utc())
            .await?;
        tracing::debug!(
            account_id = %caller.account_id(),
            state_id = %id,
            position = %swap.moved.position(),
            "task state reordered"
        );
        Ok(swap)
    }
}
