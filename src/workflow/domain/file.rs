//! Files attached to tasks.

use super::{TaskFileId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Storage key of a file attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFile {
    id: TaskFileId,
    task_id: TaskId,
    key_name: String,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskFileData {
    /// Persisted identifier.
    pub id: TaskFileId,
    /// Owning task.
    pub task_id: TaskId,
    /// Key issued by the file-storage service.
    pub key_name: String,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskFile {
    /// Records a file stored under `key_name`.
    #[must_use]
    pub fn new(task_id: TaskId, key_name: impl Into<String>, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskFileId::new(),
            task_id,
            key_name: key_name.into(),
            deleted: false,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task file from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskFileData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            key_name: data.key_name,
            deleted: data.deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the file identifier.
    #[must_use]
    pub const fn id(&self) -> TaskFileId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the storage key.
    #[must_use]
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Returns `true` once the file has been trashed.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) const fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.updated_at = now;
    }
}
