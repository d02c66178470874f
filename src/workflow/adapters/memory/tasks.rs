//! In-memory task repository.

use super::{InMemoryWorkflowStore, WorkflowState};
use crate::workflow::{
    domain::{AccountId, BoardId, Conflict, EntityRef, Task, TaskAction, TaskId, TransitionTarget},
    ports::{
        TaskRepository, TransitionedTask, Visibility, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

impl WorkflowState {
    fn task_name_clash(&self, board_id: BoardId, name: &str, except: Option<TaskId>) -> bool {
        self.tasks
            .values()
            .filter(|task| !task.is_deleted() && task.board_id() == board_id)
            .filter(|task| Some(task.id()) != except)
            .any(|task| task.name() == name)
    }

    fn ensure_live_task(&self, id: TaskId) -> WorkflowRepositoryResult<()> {
        let live = self.tasks.get(&id).is_some_and(|task| !task.is_deleted());
        if live {
            Ok(())
        } else {
            Err(WorkflowRepositoryError::NotFound(EntityRef::Task(id)))
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryWorkflowStore {
    async fn store_task(&self, task: &Task, action: &TaskAction) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_live_board(task.board_id())?;
        if state.ordering(task.board_id()).get(task.state_id()).is_none() {
            return Err(WorkflowRepositoryError::NotFound(EntityRef::TaskState(
                task.state_id(),
            )));
        }
        if state.task_name_clash(task.board_id(), task.name(), None) {
            return Err(Conflict::TaskName(task.name().to_owned()).into());
        }
        state.tasks.insert(task.id(), task.clone());
        state.append_action(action);
        Ok(())
    }

    async fn update_task(
        &self,
        task: &Task,
        actions: &[TaskAction],
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_live_task(task.id())?;
        if state.task_name_clash(task.board_id(), task.name(), Some(task.id())) {
            return Err(Conflict::TaskName(task.name().to_owned()).into());
        }
        if let Some(stored) = state.tasks.get_mut(&task.id()) {
            stored.copy_details_from(task);
        }
        for action in actions {
            state.append_action(action);
        }
        Ok(())
    }

    async fn transition_task(
        &self,
        id: TaskId,
        target: &TransitionTarget,
        actor_id: AccountId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TransitionedTask> {
        let mut state = self.write()?;
        let mut task = state
            .tasks
            .get(&id)
            .filter(|found| !found.is_deleted())
            .cloned()
            .ok_or(WorkflowRepositoryError::NotFound(EntityRef::Task(id)))?;
        let transition = state
            .ordering(task.board_id())
            .resolve_transition(task.state_id(), target)?;
        let action = task.apply_transition(&transition, actor_id, at)?;
        state.tasks.insert(id, task.clone());
        state.append_action(&action);
        Ok(TransitionedTask { task, action })
    }

    async fn find_task(
        &self,
        id: TaskId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| visibility.admits(task.is_deleted()))
            .cloned())
    }

    async fn list_tasks(&self, board_id: BoardId) -> WorkflowRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.board_id() == board_id && !task.is_deleted())
            .cloned()
            .collect();
        tasks.sort_by_key(Task::created_at);
        Ok(tasks)
    }

    async fn task_name_taken(
        &self,
        board_id: BoardId,
        name: &str,
        except: Option<TaskId>,
    ) -> WorkflowRepositoryResult<bool> {
        let state = self.read()?;
        Ok(state.task_name_clash(board_id, name, except))
    }

    async fn trash_task(
        &self,
        id: TaskId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<usize> {
        let mut state = self.write()?;
        state.ensure_live_task(id)?;
        let trashed = state.trash_assignments_of(id, at);
        state.append_action(action);
        if let Some(task) = state.tasks.get_mut(&id) {
            task.mark_deleted(at);
        }
        Ok(trashed)
    }
}
