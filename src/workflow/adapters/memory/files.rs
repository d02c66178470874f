//! In-memory task file repository.

use super::InMemoryWorkflowStore;
use crate::workflow::{
    domain::{EntityRef, TaskAction, TaskFile, TaskFileId, TaskId},
    ports::{TaskFileRepository, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl TaskFileRepository for InMemoryWorkflowStore {
    async fn store_task_file(
        &self,
        file: &TaskFile,
        action: &TaskAction,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        state.files.insert(file.id(), file.clone());
        state.append_action(action);
        Ok(())
    }

    async fn find_task_file(&self, id: TaskFileId) -> WorkflowRepositoryResult<Option<TaskFile>> {
        let state = self.read()?;
        Ok(state.files.get(&id).filter(|file| !file.is_deleted()).cloned())
    }

    async fn find_task_file_by_key(
        &self,
        task_id: TaskId,
        key_name: &str,
    ) -> WorkflowRepositoryResult<Option<TaskFile>> {
        let state = self.read()?;
        Ok(state
            .files
            .values()
            .find(|file| {
                !file.is_deleted() && file.task_id() == task_id && file.key_name() == key_name
            })
            .cloned())
    }

    async fn list_task_files(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<TaskFile>> {
        let state = self.read()?;
        let mut files: Vec<TaskFile> = state
            .files
            .values()
            .filter(|file| file.task_id() == task_id && !file.is_deleted())
            .cloned()
            .collect();
        files.sort_by_key(TaskFile::created_at);
        Ok(files)
    }

    async fn trash_task_file(
        &self,
        id: TaskFileId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let file = state
            .files
            .get_mut(&id)
            .filter(|file| !file.is_deleted())
            .ok_or(WorkflowRepositoryError::NotFound(EntityRef::TaskFile(id)))?;
        file.mark_deleted(at);
        state.append_action(action);
        Ok(())
    }

    async fn trash_task_files(
        &self,
        task_id: TaskId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<usize> {
        let mut state = self.write()?;
        let mut trashed = 0_usize;
        for file in state
            .files
            .values_mut()
            .filter(|file| file.task_id() == task_id && !file.is_deleted())
        {
            file.mark_deleted(at);
            trashed = trashed.saturating_add(1);
        }
        state.append_action(action);
        Ok(trashed)
    }
}
