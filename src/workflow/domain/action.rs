//! Append-only audit records of task mutations.

use super::{AccountId, ParseWorkflowValueError, TaskActionId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskActionType {
    /// Task created.
    Created,
    /// A task field or its state changed without a positional move.
    Updated,
    /// Task moved to a later state.
    MovedForward,
    /// Task moved to an earlier state.
    MovedBackward,
    /// Account assigned.
    Assigned,
    /// Account unassigned.
    Unassigned,
    /// Task trashed.
    Deleted,
    /// File attached.
    FileUploaded,
    /// One attached file removed.
    FileDeleted,
    /// Every attached file removed.
    TaskAllFilesDeleted,
}

impl TaskActionType {
    /// Every action type, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Created,
        Self::Updated,
        Self::MovedForward,
        Self::MovedBackward,
        Self::Assigned,
        Self::Unassigned,
        Self::Deleted,
        Self::FileUploaded,
        Self::FileDeleted,
        Self::TaskAllFilesDeleted,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::MovedForward => "MOVED_FORWARD",
            Self::MovedBackward => "MOVED_BACKWARD",
            Self::Assigned => "ASSIGNED",
            Self::Unassigned => "UNASSIGNED",
            Self::Deleted => "DELETED",
            Self::FileUploaded => "FILE_UPLOADED",
            Self::FileDeleted => "FILE_DELETED",
            Self::TaskAllFilesDeleted => "TASK_ALL_FILES_DELETED",
        }
    }
}

impl fmt::Display for TaskActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskActionType {
    type Error = ParseWorkflowValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseWorkflowValueError::new("task action type", value))
    }
}

/// Immutable audit record for one task mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAction {
    id: TaskActionId,
    task_id: TaskId,
    action_type: TaskActionType,
    actor_id: AccountId,
    old_value: Option<String>,
    new_value: Option<String>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskActionData {
    /// Persisted identifier.
    pub id: TaskActionId,
    /// Task the record describes.
    pub task_id: TaskId,
    /// Kind of mutation.
    pub action_type: TaskActionType,
    /// Account that performed the mutation.
    pub actor_id: AccountId,
    /// Value before the mutation.
    pub old_value: Option<String>,
    /// Value after the mutation.
    pub new_value: Option<String>,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskAction {
    /// Starts a record stamped with the current clock time.
    ///
    /// # Examples
    ///
    /// ```
    /// use mockable::DefaultClock;
    /// use taskboard::workflow::domain::{AccountId, TaskAction, TaskActionType, TaskId};
    ///
    /// let action = TaskAction::record(
    ///     TaskId::new(),
    ///     TaskActionType::MovedForward,
    ///     AccountId::new(7),
    ///     &DefaultClock,
    /// )
    /// .with_old_value("NEW")
    /// .with_new_value("IN_PROGRESS");
    ///
    /// assert_eq!(action.old_value(), Some("NEW"));
    /// assert_eq!(action.new_value(), Some("IN_PROGRESS"));
    /// assert!(action.comment().is_none());
    /// ```
    #[must_use]
    pub fn record(
        task_id: TaskId,
        action_type: TaskActionType,
        actor_id: AccountId,
        clock: &impl Clock,
    ) -> Self {
        Self::record_at(task_id, action_type, actor_id, clock.utc())
    }

    /// Starts a record stamped with `created_at`.
    #[must_use]
    pub fn record_at(
        task_id: TaskId,
        action_type: TaskActionType,
        actor_id: AccountId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskActionId::new(),
            task_id,
            action_type,
            actor_id,
            old_value: None,
            new_value: None,
            comment: None,
            created_at,
        }
    }

    /// Sets the value before the mutation.
    #[must_use]
    pub fn with_old_value(mut self, value: impl Into<String>) -> Self {
        self.old_value = Some(value.into());
        self
    }

    /// Sets the value after the mutation.
    #[must_use]
    pub fn with_new_value(mut self, value: impl Into<String>) -> Self {
        self.new_value = Some(value.into());
        self
    }

    /// Sets a free-text comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskActionData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            action_type: data.action_type,
            actor_id: data.actor_id,
            old_value: data.old_value,
            new_value: data.new_value,
            comment: data.comment,
            created_at: data.created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> TaskActionId {
        self.id
    }

    /// Returns the task the record describes.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the kind of mutation.
    #[must_use]
    pub const fn action_type(&self) -> TaskActionType {
        self.action_type
    }

    /// Returns the acting account.
    #[must_use]
    pub const fn actor_id(&self) -> AccountId {
        self.actor_id
    }

    /// Returns the value before the mutation.
    #[must_use]
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// Returns the value after the mutation.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Returns the free-text comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the recording timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
