//! Error types for workflow domain validation and parsing.

use super::{AccountId, BoardId, MoveDirection, ProjectId, ReorderDirection, TaskActionId};
use super::{AccountTaskId, TaskFileId, TaskId, TaskStateId};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Coarse error classification shared by every layer.
///
/// The HTTP surface maps each kind to a fixed status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The addressed entity does not exist or is archived.
    NotFound,
    /// A uniqueness rule would be violated.
    Conflict,
    /// The caller is not allowed to perform the operation.
    Forbidden,
    /// The request is structurally valid but semantically rejected.
    BadRequest,
    /// A collaborator service failed or was unreachable.
    Upstream,
    /// Persistence or other unexpected failure.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Forbidden => "forbidden",
            Self::BadRequest => "bad_request",
            Self::Upstream => "upstream",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an entity that could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// A project.
    Project(ProjectId),
    /// A board.
    Board(BoardId),
    /// A task state.
    TaskState(TaskStateId),
    /// A task.
    Task(TaskId),
    /// An active assignment of an account to a task.
    Assignment {
        /// Task side of the pair.
        task_id: TaskId,
        /// Account side of the pair.
        account_id: AccountId,
    },
    /// An assignment row addressed by its own identifier.
    AssignmentRow(AccountTaskId),
    /// A file attached to a task.
    TaskFile(TaskFileId),
    /// A file of the task addressed by its storage key.
    TaskFileKey(TaskId),
    /// An audit record.
    Action(TaskActionId),
}

impl EntityRef {
    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Project(_) => "PROJECT_NOT_FOUND",
            Self::Board(_) => "BOARD_NOT_FOUND",
            Self::TaskState(_) => "TASK_STATE_NOT_FOUND",
            Self::Task(_) => "TASK_NOT_FOUND",
            Self::Assignment { .. } | Self::AssignmentRow(_) => "ACCOUNT_TASK_NOT_FOUND",
            Self::TaskFile(_) | Self::TaskFileKey(_) => "TASK_FILE_NOT_FOUND",
            Self::Action(_) => "TASK_ACTION_NOT_FOUND",
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project {id}"),
            Self::Board(id) => write!(f, "board {id}"),
            Self::TaskState(id) => write!(f, "task state {id}"),
            Self::Task(id) => write!(f, "task {id}"),
            Self::Assignment {
                task_id,
                account_id,
            } => write!(f, "assignment of account {account_id} to task {task_id}"),
            Self::AssignmentRow(id) => write!(f, "assignment {id}"),
            Self::TaskFile(id) => write!(f, "task file {id}"),
            Self::TaskFileKey(id) => write!(f, "file with the requested key on task {id}"),
            Self::Action(id) => write!(f, "task action {id}"),
        }
    }
}

/// Uniqueness rule that an operation would violate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    /// Project name already used within the organization.
    #[error("project name '{0}' is already used in this organization")]
    ProjectName(String),
    /// Board name already used within the project.
    #[error("board name '{0}' is already used in this project")]
    BoardName(String),
    /// Task name already used within the board.
    #[error("task name '{0}' is already used on this board")]
    TaskName(String),
    /// Task state name already used within the board.
    #[error("task state name '{0}' is already used on this board")]
    StateName(String),
    /// Task state code already used within the board.
    #[error("task state code '{0}' is already used on this board")]
    StateCode(String),
    /// The account is already actively assigned to the task.
    #[error("account {account_id} is already assigned to task {task_id}")]
    Assignment {
        /// Task side of the pair.
        task_id: TaskId,
        /// Account side of the pair.
        account_id: AccountId,
    },
    /// The task state still holds live tasks.
    #[error("task state {0} still holds live tasks")]
    StateInUse(TaskStateId),
}

impl Conflict {
    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ProjectName(_) => "PROJECT_ALREADY_EXISTS",
            Self::BoardName(_) => "BOARD_ALREADY_EXISTS",
            Self::TaskName(_) => "TASK_ALREADY_EXISTS",
            Self::StateName(_) | Self::StateCode(_) => "TASK_STATE_ALREADY_EXISTS",
            Self::Assignment { .. } => "ACCOUNT_ALREADY_ASSIGNED",
            Self::StateInUse(_) => "TASK_STATE_IN_USE",
        }
    }
}

/// Errors returned while constructing or mutating workflow values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowDomainError {
    /// A required text field is empty after trimming.
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),

    /// A text field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    ValueTooLong {
        /// Field name.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// Priority outside `1..=5`.
    #[error("invalid priority {0}, expected a value between 1 and 5")]
    InvalidPriority(i32),

    /// A stored position is not a positive integer.
    #[error("invalid state position {0}, expected a positive integer")]
    InvalidPosition(i64),

    /// A uniqueness rule would be violated.
    #[error(transparent)]
    Conflict(#[from] Conflict),

    /// The state does not exist among the board's live states.
    #[error("task state {0} not found on this board")]
    StateNotFound(TaskStateId),

    /// No live state of the board carries the code.
    #[error("no task state with code '{code}' on board {board_id}")]
    StateCodeNotFound {
        /// Board that was searched.
        board_id: BoardId,
        /// Requested code.
        code: String,
    },

    /// The state belongs to a different board than the one addressed.
    #[error("task state {state_id} belongs to another board than {board_id}")]
    StateOnAnotherBoard {
        /// Offending state.
        state_id: TaskStateId,
        /// Board that was addressed.
        board_id: BoardId,
    },

    /// The task sits at the first or last state and cannot move further.
    #[error("task in state {state_id} cannot move {direction}")]
    MoveOutOfBounds {
        /// Current state of the task.
        state_id: TaskStateId,
        /// Requested direction.
        direction: MoveDirection,
    },

    /// The state is already first or last and cannot be reordered further.
    #[error("task state {state_id} cannot move {direction}")]
    ReorderOutOfBounds {
        /// State being reordered.
        state_id: TaskStateId,
        /// Requested direction.
        direction: ReorderDirection,
    },
}

impl WorkflowDomainError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::StateNotFound(_) | Self::StateCodeNotFound { .. } => ErrorKind::NotFound,
            Self::EmptyValue(_)
            | Self::ValueTooLong { .. }
            | Self::InvalidPriority(_)
            | Self::StateOnAnotherBoard { .. }
            | Self::MoveOutOfBounds { .. }
            | Self::ReorderOutOfBounds { .. } => ErrorKind::BadRequest,
            Self::InvalidPosition(_) => ErrorKind::Internal,
        }
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyValue(_) | Self::ValueTooLong { .. } => "INVALID_FIELD",
            Self::InvalidPriority(_) => "INVALID_PRIORITY",
            Self::InvalidPosition(_) => "INVALID_POSITION",
            Self::Conflict(conflict) => conflict.code(),
            Self::StateNotFound(_) | Self::StateCodeNotFound { .. } => "TASK_STATE_NOT_FOUND",
            Self::StateOnAnotherBoard { .. } => "STATE_ON_ANOTHER_BOARD",
            Self::MoveOutOfBounds { .. } => "MOVE_OUT_OF_BOUNDS",
            Self::ReorderOutOfBounds { .. } => "REORDER_OUT_OF_BOUNDS",
        }
    }
}

/// Error returned while parsing workflow enumerations from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {expected} value: {value}")]
pub struct ParseWorkflowValueError {
    /// Name of the enumeration being parsed.
    pub expected: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseWorkflowValueError {
    pub(crate) fn new(expected: &'static str, value: &str) -> Self {
        Self {
            expected,
            value: value.to_owned(),
        }
    }
}
