//! Task aggregate and its position-based transitions.

use super::fields::{TASK_DESCRIPTION_MAX, TASK_NAME_MAX, required_text};
use super::{
    AccountId, BoardId, NeighborDirection, ParseWorkflowValueError, StateTransition, TaskAction,
    TaskId, TaskState, TaskStateId, WorkflowDomainError,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a single-step task move along the board ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveDirection {
    /// Towards the next state by position.
    Forward,
    /// Towards the previous state by position.
    Backward,
}

impl MoveDirection {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "FORWARD",
            Self::Backward => "BACKWARD",
        }
    }

    /// Returns which neighbor of the current state the move targets.
    #[must_use]
    pub const fn neighbor(self) -> NeighborDirection {
        match self {
            Self::Forward => NeighborDirection::Next,
            Self::Backward => NeighborDirection::Previous,
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MoveDirection {
    type Error = ParseWorkflowValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FORWARD" => Ok(Self::Forward),
            "BACKWARD" => Ok(Self::Backward),
            _ => Err(ParseWorkflowValueError::new("move direction", value)),
        }
    }
}

/// Task priority between one and five inclusive.
///
/// # Examples
///
/// ```
/// use taskboard::workflow::domain::Priority;
///
/// assert_eq!(Priority::new(3).map(Priority::value), Ok(3));
/// assert!(Priority::new(0).is_err());
/// assert!(Priority::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Priority(i32);

impl Priority {
    /// Lowest accepted priority.
    pub const MIN: i32 = 1;
    /// Highest accepted priority.
    pub const MAX: i32 = 5;

    /// Validates a raw priority.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidPriority`] outside `1..=5`.
    pub const fn new(value: i32) -> Result<Self, WorkflowDomainError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(WorkflowDomainError::InvalidPriority(value))
        }
    }

    /// Returns the raw priority.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Priority {
    type Error = WorkflowDomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Board the task lives on.
    pub board_id: BoardId,
    /// Task name, unique on the board.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Priority.
    pub priority: Priority,
    /// Creating account, which becomes the owner.
    pub owner_id: AccountId,
}

/// Partial update of a task. Unset fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New priority.
    pub priority: Option<Priority>,
}

/// A single field difference produced by [`Task::apply_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Field label as recorded in the audit log.
    pub field: &'static str,
    /// Previous value rendered as text.
    pub old: String,
    /// New value rendered as text.
    pub new: String,
}

impl FieldChange {
    /// Returns the audit old value, `field:old`.
    #[must_use]
    pub fn old_value(&self) -> String {
        format!("{}:{}", self.field, self.old)
    }

    /// Returns the audit new value, `field:new`.
    #[must_use]
    pub fn new_value(&self) -> String {
        format!("{}:{}", self.field, self.new)
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    board_id: BoardId,
    name: String,
    description: String,
    due_date: NaiveDate,
    priority: Priority,
    owner_id: AccountId,
    state_id: TaskStateId,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted identifier.
    pub id: TaskId,
    /// Board the task lives on.
    pub board_id: BoardId,
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Priority.
    pub priority: Priority,
    /// Owning account.
    pub owner_id: AccountId,
    /// Current state.
    pub state_id: TaskStateId,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task in `initial`, which must be a state of the same board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when a text field is invalid or the
    /// initial state belongs to another board.
    pub fn new(
        input: &NewTask,
        initial: &TaskState,
        clock: &impl Clock,
    ) -> Result<Self, WorkflowDomainError> {
        ensure_same_board(input.board_id, initial)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            board_id: input.board_id,
            name: Self::validate_name(&input.name)?,
            description: validate_description(&input.description)?,
            due_date: input.due_date,
            priority: input.priority,
            owner_id: input.owner_id,
            state_id: initial.id(),
            deleted: false,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            name: data.name,
            description: data.description,
            due_date: data.due_date,
            priority: data.priority,
            owner_id: data.owner_id,
            state_id: data.state_id,
            deleted: data.deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Validates a task name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name is empty or too long.
    pub fn validate_name(name: &str) -> Result<String, WorkflowDomainError> {
        required_text("task name", name, TASK_NAME_MAX)
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the board the task lives on.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the owning account.
    #[must_use]
    pub const fn owner_id(&self) -> AccountId {
        self.owner_id
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state_id(&self) -> TaskStateId {
        self.state_id
    }

    /// Returns `true` once the task has been trashed.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns `true` when `account` owns the task.
    #[must_use]
    pub fn is_owned_by(&self, account: AccountId) -> bool {
        self.owner_id == account
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

    /// Moves the task along a resolved transition at `now` and returns the
    /// record describing the move.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::StateOnAnotherBoard`] when the target
    /// belongs to a different board.
    pub fn apply_transition(
        &mut self,
        transition: &StateTransition,
        actor_id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<TaskAction, WorkflowDomainError> {
        ensure_same_board(self.board_id, &transition.to)?;
        self.state_id = transition.to.id();
        self.updated_at = now;
        Ok(
            TaskAction::record_at(self.id, transition.action_type, actor_id, now)
                .with_old_value(transition.from.code())
                .with_new_value(transition.to.code()),
        )
    }

    /// Copies the editable fields of `edited` onto this task, keeping its
    /// current state.
    pub(crate) fn copy_details_from(&mut self, edited: &Self) {
        self.name.clone_from(&edited.name);
        self.description.clone_from(&edited.description);
        self.due_date = edited.due_date;
        self.priority = edited.priority;
        self.updated_at = edited.updated_at;
    }

    /// Applies a partial update and reports each field whose value changed.
    ///
    /// Fields set to their current value produce no [`FieldChange`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when a provided field is invalid. The
    /// task is left unchanged on error.
    pub fn apply_changes(
        &mut self,
        changes: &TaskChanges,
        clock: &impl Clock,
    ) -> Result<Vec<FieldChange>, WorkflowDomainError> {
        let name = changes
            .name
            .as_deref()
            .map(Self::validate_name)
            .transpose()?;
        let description = changes
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        let mut diff = Vec::new();
        if let Some(new_name) = name.filter(|value| *value != self.name) {
            diff.push(FieldChange {
                field: "name",
                old: std::mem::replace(&mut self.name, new_name.clone()),
                new: new_name,
            });
        }
        if let Some(new_description) = description.filter(|value| *value != self.description) {
            diff.push(FieldChange {
                field: "description",
                old: std::mem::replace(&mut self.description, new_description.clone()),
                new: new_description,
            });
        }
        if let Some(new_due) = changes.due_date.filter(|value| *value != self.due_date) {
            diff.push(FieldChange {
                field: "dueDate",
                old: self.due_date.to_string(),
                new: new_due.to_string(),
            });
            self.due_date = new_due;
        }
        if let Some(new_priority) = changes.priority.filter(|value| *value != self.priority) {
            diff.push(FieldChange {
                field: "priority",
                old: self.priority.value().to_string(),
                new: new_priority.value().to_string(),
            });
            self.priority = new_priority;
        }

        if !diff.is_empty() {
            self.touch(clock);
        }
        Ok(diff)
    }

    pub(crate) const fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.updated_at = now;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn validate_description(value: &str) -> Result<String, WorkflowDomainError> {
    required_text("task description", value, TASK_DESCRIPTION_MAX)
}

fn ensure_same_board(board_id: BoardId, state: &TaskState) -> Result<(), WorkflowDomainError> {
    if state.board_id() == board_id {
        Ok(())
    } else {
        Err(WorkflowDomainError::StateOnAnotherBoard {
            state_id: state.id(),
            board_id,
        })
    }
}
