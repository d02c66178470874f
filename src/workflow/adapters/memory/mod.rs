//! In-memory adapters for workflow tests and local runs.
//!
//! [`InMemoryWorkflowStore`] implements every repository port over a single
//! lock-protected state. Each operation validates first and then mutates
//! while holding the write lock, so a failed operation leaves no partial
//! change behind.

mod actions;
mod assignments;
mod boards;
mod collaborators;
mod files;
mod projects;
mod states;
mod tasks;

pub use collaborators::{InMemoryFileStorage, RecordingNotificationChannel, StaticDirectory};

use crate::workflow::{
    domain::{
        AccountTask, AccountTaskId, Board, BoardId, Project, ProjectId, StateOrdering, Task,
        TaskAction, TaskActionId, TaskFile, TaskFileId, TaskId, TaskState, TaskStateId,
    },
    ports::{CascadeSummary, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory implementation of every workflow repository port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    state: Arc<RwLock<WorkflowState>>,
}

#[derive(Debug, Default)]
struct WorkflowState {
    projects: HashMap<ProjectId, Project>,
    boards: HashMap<BoardId, Board>,
    states: HashMap<TaskStateId, TaskState>,
    tasks: HashMap<TaskId, Task>,
    assignments: HashMap<AccountTaskId, AccountTask>,
    actions: Vec<TaskAction>,
    outbox: HashMap<TaskActionId, OutboxEntry>,
    files: HashMap<TaskFileId, TaskFile>,
}

#[derive(Debug, Default, Clone)]
struct OutboxEntry {
    attempts: u32,
    last_error: Option<String>,
    dispatched_at: Option<DateTime<Utc>>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> WorkflowRepositoryResult<RwLockReadGuard<'_, WorkflowState>> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> WorkflowRepositoryResult<RwLockWriteGuard<'_, WorkflowState>> {
        self.state.write().map_err(poisoned)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> WorkflowRepositoryError {
    WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl WorkflowState {
    fn append_action(&mut self, action: &TaskAction) {
        self.actions.push(action.clone());
        self.outbox.insert(action.id(), OutboxEntry::default());
    }

    fn ordering(&self, board_id: BoardId) -> StateOrdering {
        let states = self
            .states
            .values()
            .filter(|state| state.board_id() == board_id)
            .cloned()
            .collect();
        StateOrdering::new(board_id, states)
    }

    fn save_states<'a>(&mut self, states: impl IntoIterator<Item = &'a TaskState>) {
        for state in states {
            self.states.insert(state.id(), state.clone());
        }
    }

    fn live_assignment_ids(&self, task_id: TaskId) -> Vec<AccountTaskId> {
        self.assignments
            .values()
            .filter(|assignment| assignment.task_id() == task_id && !assignment.is_deleted())
            .map(AccountTask::id)
            .collect()
    }

    fn trash_assignments_of(&mut self, task_id: TaskId, at: DateTime<Utc>) -> usize {
        let ids = self.live_assignment_ids(task_id);
        for id in &ids {
            if let Some(assignment) = self.assignments.get_mut(id) {
                assignment.mark_deleted(at);
            }
        }
        ids.len()
    }

    fn trash_board_cascade(&mut self, board_id: BoardId, at: DateTime<Utc>) -> CascadeSummary {
        let task_ids: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|task| task.board_id() == board_id && !task.is_deleted())
            .map(Task::id)
            .collect();

        let mut summary = CascadeSummary {
            boards: 0,
            tasks: task_ids.len(),
            assignments: 0,
        };
        for task_id in &task_ids {
            summary.assignments = summary
                .assignments
                .saturating_add(self.trash_assignments_of(*task_id, at));
        }
        for task_id in &task_ids {
            if let Some(task) = self.tasks.get_mut(task_id) {
                task.mark_deleted(at);
            }
        }
        if let Some(board) = self
            .boards
            .get_mut(&board_id)
            .filter(|board| !board.is_deleted())
        {
            board.mark_deleted(at);
            summary.boards = 1;
        }
        summary
    }

    fn live_board_ids(&self, project_id: ProjectId) -> Vec<BoardId> {
        self.boards
            .values()
            .filter(|board| board.project_id() == project_id && !board.is_deleted())
            .map(Board::id)
            .collect()
    }
}
