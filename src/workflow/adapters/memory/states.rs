//! In-memory task state repository.
//!
//! The write lock serializes every position change, standing in for the
//! row locks the PostgreSQL adapter takes.

use super::{InMemoryWorkflowStore, WorkflowState};
use crate::workflow::{
    domain::{
        BoardId, Conflict, EntityRef, ReorderDirection, StateOrdering, StateSwap, TaskState,
        TaskStateId,
    },
    ports::{TaskStateRepository, Visibility, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

impl WorkflowState {
    fn live_state_board(&self, id: TaskStateId) -> WorkflowRepositoryResult<BoardId> {
        self.states
            .get(&id)
            .filter(|state| !state.is_deleted())
            .map(TaskState::board_id)
            .ok_or(WorkflowRepositoryError::NotFound(EntityRef::TaskState(id)))
    }

    pub(super) fn ensure_live_board(&self, board_id: BoardId) -> WorkflowRepositoryResult<()> {
        let live = self
            .boards
            .get(&board_id)
            .is_some_and(|board| !board.is_deleted());
        if live {
            Ok(())
        } else {
            Err(WorkflowRepositoryError::NotFound(EntityRef::Board(board_id)))
        }
    }
}

#[async_trait]
impl TaskStateRepository for InMemoryWorkflowStore {
    async fn board_states(&self, board_id: BoardId) -> WorkflowRepositoryResult<StateOrdering> {
        let state = self.read()?;
        Ok(state.ordering(board_id))
    }

    async fn find_task_state(
        &self,
        id: TaskStateId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<TaskState>> {
        let state = self.read()?;
        Ok(state
            .states
            .get(&id)
            .filter(|task_state| visibility.admits(task_state.is_deleted()))
            .cloned())
    }

    async fn list_all_task_states(&self) -> WorkflowRepositoryResult<Vec<TaskState>> {
        let state = self.read()?;
        let mut states: Vec<TaskState> = state
            .states
            .values()
            .filter(|task_state| !task_state.is_deleted())
            .cloned()
            .collect();
        states.sort_by_key(|task_state| (task_state.board_id(), task_state.position()));
        Ok(states)
    }

    async fn insert_task_state(
        &self,
        board_id: BoardId,
        name: &str,
        code: &str,
        after: Option<TaskStateId>,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState> {
        let mut state = self.write()?;
        state.ensure_live_board(board_id)?;
        let mut ordering = state.ordering(board_id);
        let insertion = ordering.insert(name, code, after, at)?;
        state.save_states(ordering.states());
        Ok(insertion.state)
    }

    async fn remove_task_state(
        &self,
        id: TaskStateId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState> {
        let mut state = self.write()?;
        let board_id = state.live_state_board(id)?;
        let in_use = state
            .tasks
            .values()
            .any(|task| task.state_id() == id && !task.is_deleted());
        if in_use {
            return Err(Conflict::StateInUse(id).into());
        }

        let mut ordering = state.ordering(board_id);
        let removal = ordering.remove(id, at)?;
        state.save_states(ordering.states());
        state.save_states([&removal.removed]);
        Ok(removal.removed)
    }

    async fn rename_task_state(
        &self,
        id: TaskStateId,
        name: Option<&str>,
        code: Option<&str>,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState> {
        let mut state = self.write()?;
        let board_id = state.live_state_board(id)?;
        let mut ordering = state.ordering(board_id);
        let renamed = ordering.rename(id, name, code, at)?;
        state.save_states([&renamed]);
        Ok(renamed)
    }

    async fn reorder_task_state(
        &self,
        id: TaskStateId,
        direction: ReorderDirection,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<StateSwap> {
        let mut state = self.write()?;
        let board_id = state.live_state_board(id)?;
        let mut ordering = state.ordering(board_id);
        let swap = ordering.reorder(id, direction, at)?;
        state.save_states([&swap.moved, &swap.displaced]);
        Ok(swap)
    }
}
