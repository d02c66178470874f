//! Account-to-task assignments.

use super::{AccountId, AccountTaskId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Links an account to a task it may act on.
///
/// At most one live assignment exists per `(task, account)` pair. Trashed
/// assignments stay for history and do not block re-assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTask {
    id: AccountTaskId,
    task_id: TaskId,
    account_id: AccountId,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAccountTaskData {
    /// Persisted identifier.
    pub id: AccountTaskId,
    /// Assigned task.
    pub task_id: TaskId,
    /// Assigned account.
    pub account_id: AccountId,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AccountTask {
    /// Creates a live assignment.
    #[must_use]
    pub fn new(task_id: TaskId, account_id: AccountId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: AccountTaskId::new(),
            task_id,
            account_id,
            deleted: false,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedAccountTaskData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            account_id: data.account_id,
            deleted: data.deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AccountTaskId {
        self.id
    }

    /// Returns the assigned task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the assigned account.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns `true` once the assignment has been trashed.
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
