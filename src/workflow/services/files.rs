//! Task attachments stored through the file-storage collaborator.

use super::error::{WorkflowError, WorkflowResult};
use crate::workflow::{
    domain::{CallerContext, EntityRef, TaskAction, TaskActionType, TaskFile, TaskFileId, TaskId},
    ports::{FileStorage, Visibility, WorkflowRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Uploads, lists and deletes the files attached to tasks.
#[derive(Clone)]
pub struct FileAttachmentService<R, S, C>
where
    R: WorkflowRepository,
    S: FileStorage,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    storage: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> FileAttachmentService<R, S, C>
where
    R: WorkflowRepository,
    S: FileStorage,
    C: Clock + Send + Sync,
{
    /// Creates a new attachment service.
    #[must_use]
    pub const fn new(repository: Arc<R>, storage: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            repository,
            storage,
            clock,
        }
    }

    /// Stores `bytes` and attaches the resulting key to a live task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown tasks and
    /// [`WorkflowError::FileStorage`] when the upload fails.
    pub async fn upload(
        &self,
        caller: &CallerContext,
        task_id: TaskId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> WorkflowResult<TaskFile> {
        self.ensure_task(task_id).await?;
        let key = self.storage.upload(file_name, bytes).await?;
        let file = TaskFile::new(task_id, key.as_str(), &*self.clock);
        let action = TaskAction::record(
            task_id,
            TaskActionType::FileUploaded,
            caller.account_id(),
            &*self.clock,
        )
        .with_new_value(key.as_str());
        self.repository.store_task_file(&file, &action).await?;
        tracing::info!(task_id = %task_id, key = %key, "file attached");
        Ok(file)
    }

    /// Lists the live files of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown tasks.
    pub async fn list(&self, task_id: TaskId) -> WorkflowResult<Vec<TaskFile>> {
        self.ensure_task(task_id).await?;
        Ok(self.repository.list_task_files(task_id).await?)
    }

    /// Deletes one file of a task by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the file is not a live file
    /// of the task, and [`WorkflowError::FileStorage`] when the collaborator
    /// refuses the deletion.
    pub async fn delete(
        &self,
        caller: &CallerContext,
        file_id: TaskFileId,
        task_id: TaskId,
    ) -> WorkflowResult<()> {
        self.ensure_task(task_id).await?;
        let file = self
            .repository
            .find_task_file(file_id)
            .await?
            .filter(|found| found.task_id() == task_id)
            .ok_or(WorkflowError::NotFound(EntityRef::TaskFile(file_id)))?;
        self.remove(caller, &file).await
    }

    /// Deletes one file of a task by its storage key.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when no live file of the task uses
    /// the key.
    pub async fn delete_by_key(
        &self,
        caller: &CallerContext,
        key_name: &str,
        task_id: TaskId,
    ) -> WorkflowResult<()> {
        self.ensure_task(task_id).await?;
        let file = self
            .repository
            .find_task_file_by_key(task_id, key_name)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::TaskFileKey(task_id)))?;
        self.remove(caller, &file).await
    }

    /// Deletes every live file of a task and records a single action.
    ///
    /// Returns the number of files removed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::FileStorage`] when the collaborator refuses
    /// a deletion. Nothing is trashed in that case.
    pub async fn delete_all(&self, caller: &CallerContext, task_id: TaskId) -> WorkflowResult<usize> {
        self.ensure_task(task_id).await?;
        let files = self.repository.list_task_files(task_id).await?;
        for file in &files {
            self.storage.delete(file.key_name()).await?;
        }
        let action = TaskAction::record(
            task_id,
            TaskActionType::TaskAllFilesDeleted,
            caller.account_id(),
            &*self.clock,
        );
        let removed = self
            .repository
            .trash_task_files(task_id, &action, self.clock.utc())
            .await?;
        tracing::info!(task_id = %task_id, removed, "all files removed");
        Ok(removed)
    }

    async fn remove(&self, caller: &CallerContext, file: &TaskFile) -> WorkflowResult<()> {
        self.storage.delete(file.key_name()).await?;
        let action = TaskAction::record(
            file.task_id(),
            TaskActionType::FileDeleted,
            caller.account_id(),
            &*self.clock,
        )
        .with_old_value(file.key_name());
        self.repository
            .trash_task_file(file.id(), &action, self.clock.utc())
            .await?;
        tracing::info!(task_id = %file.task_id(), key = file.key_name(), "file removed");
        Ok(())
    }

    async fn ensure_task(&self, task_id: TaskId) -> WorkflowResult<()> {
        self.repository
            .find_task(task_id, Visibility::Active)
            .await?
            .map(|_| ())
            .ok_or(WorkflowError::NotFound(EntityRef::Task(task_id)))
    }
}
