//! Board-scoped task states and their positions.

use super::fields::{STATE_CODE_MAX, STATE_NAME_MAX, required_text};
use super::{BoardId, ParseWorkflowValueError, TaskStateId, WorkflowDomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Codes seeded on every new board, in workflow order.
pub const DEFAULT_STATE_CODES: [&str; 4] = ["NEW", "IN_PROGRESS", "REVIEW", "DONE"];

/// Code of the state every new task starts in.
pub const INITIAL_STATE_CODE: &str = "NEW";

/// One-based position of a live state within its board.
///
/// # Examples
///
/// ```
/// use taskboard::workflow::domain::StatePosition;
///
/// let first = StatePosition::FIRST;
/// assert_eq!(first.value(), 1);
/// assert_eq!(first.next().value(), 2);
/// assert!(StatePosition::from_stored(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePosition(u32);

impl StatePosition {
    /// Position of the head of a board.
    pub const FIRST: Self = Self(1);

    /// Converts a stored integer, rejecting values below one.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidPosition`] for non-positive
    /// values.
    pub fn from_stored(value: i32) -> Result<Self, WorkflowDomainError> {
        u32::try_from(value)
            .ok()
            .filter(|position| *position >= 1)
            .map(Self)
            .ok_or(WorkflowDomainError::InvalidPosition(i64::from(value)))
    }

    /// Returns the position directly after a raw `value`.
    ///
    /// `following(0)` is [`StatePosition::FIRST`].
    #[must_use]
    pub const fn following(value: u32) -> Self {
        Self(value.saturating_add(1))
    }

    /// Returns the raw position.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the storage representation.
    #[must_use]
    pub fn as_stored(self) -> i32 {
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }

    /// Returns the position directly after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the position directly before this one, never below one.
    #[must_use]
    pub const fn previous(self) -> Self {
        if self.0 <= 1 { Self::FIRST } else { Self(self.0 - 1) }
    }
}

impl fmt::Display for StatePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction used to reorder a state relative to its neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReorderDirection {
    /// Towards position one.
    Up,
    /// Towards the last position.
    Down,
}

impl ReorderDirection {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
        }
    }
}

impl fmt::Display for ReorderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReorderDirection {
    type Error = ParseWorkflowValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Self::Up),
            "DOWN" => Ok(Self::Down),
            _ => Err(ParseWorkflowValueError::new("reorder direction", value)),
        }
    }
}

/// A named column of a board's workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    id: TaskStateId,
    board_id: BoardId,
    name: String,
    code: String,
    position: StatePosition,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskStateData {
    /// Persisted identifier.
    pub id: TaskStateId,
    /// Owning board.
    pub board_id: BoardId,
    /// Display name.
    pub name: String,
    /// Stable code.
    pub code: String,
    /// Position within the board.
    pub position: StatePosition,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskState {
    /// Creates a live state at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name or code is empty or too
    /// long.
    pub fn new(
        board_id: BoardId,
        name: &str,
        code: &str,
        position: StatePosition,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowDomainError> {
        Ok(Self {
            id: TaskStateId::new(),
            board_id,
            name: Self::validate_name(name)?,
            code: Self::validate_code(code)?,
            position,
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the display name derived from a default code.
    ///
    /// ```
    /// use taskboard::workflow::domain::TaskState;
    ///
    /// assert_eq!(TaskState::default_name_for("IN_PROGRESS"), "IN PROGRESS");
    /// ```
    #[must_use]
    pub fn default_name_for(code: &str) -> String {
        code.replace('_', " ")
    }

    /// Reconstructs a state from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskStateData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            name: data.name,
            code: data.code,
            position: data.position,
            deleted: data.deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Validates a state name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name is empty or too long.
    pub fn validate_name(name: &str) -> Result<String, WorkflowDomainError> {
        required_text("state name", name, STATE_NAME_MAX)
    }

    /// Validates a state code.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the code is empty or too long.
    pub fn validate_code(code: &str) -> Result<String, WorkflowDomainError> {
        required_text("state code", code, STATE_CODE_MAX)
    }

    /// Returns the state identifier.
    #[must_use]
    pub const fn id(&self) -> TaskStateId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stable code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the position within the board.
    #[must_use]
    pub const fn position(&self) -> StatePosition {
        self.position
    }

    /// Returns `true` once the state has been removed.
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

    pub(crate) const fn place_at(&mut self, position: StatePosition, now: DateTime<Utc>) {
        self.position = position;
        self.updated_at = now;
    }

    pub(crate) fn relabel(&mut self, name: Option<String>, code: Option<String>, now: DateTime<Utc>) {
        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_code) = code {
            self.code = new_code;
        }
        self.updated_at = now;
    }

    pub(crate) const fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.updated_at = now;
    }
}
