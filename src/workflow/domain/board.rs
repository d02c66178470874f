//! Kanban board aggregate.

use super::fields::{BOARD_NAME_MAX, BOARD_TITLE_MAX, required_text};
use super::{BoardId, ProjectId, WorkflowDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A board belongs to one project and owns an ordered set of task states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    project_id: ProjectId,
    name: String,
    title: String,
    active: bool,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBoardData {
    /// Persisted identifier.
    pub id: BoardId,
    /// Parent project.
    pub project_id: ProjectId,
    /// Board name.
    pub name: String,
    /// Board title.
    pub title: String,
    /// Active flag.
    pub active: bool,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to a board. Unset fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardChanges {
    /// New name.
    pub name: Option<String>,
    /// New title.
    pub title: Option<String>,
    /// New active flag.
    pub active: Option<bool>,
}

impl Board {
    /// Creates a new active board under a project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name or title is empty or
    /// too long.
    pub fn new(
        project_id: ProjectId,
        name: &str,
        title: &str,
        clock: &impl Clock,
    ) -> Result<Self, WorkflowDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: BoardId::new(),
            project_id,
            name: Self::validate_name(name)?,
            title: required_text("board title", title, BOARD_TITLE_MAX)?,
            active: true,
            deleted: false,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a board from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBoardData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            name: data.name,
            title: data.title,
            active: data.active,
            deleted: data.deleted,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Validates and normalizes a board name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the name is empty or too long.
    pub fn validate_name(name: &str) -> Result<String, WorkflowDomainError> {
        required_text("board name", name, BOARD_NAME_MAX)
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the parent project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the board name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the board title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the active flag.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` once the board has been trashed.
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

    /// Applies a partial update.
    ///
    /// Name uniqueness is checked by the caller against the repository; this
    /// method only validates field shape.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when a provided field is invalid. The
    /// board is left unchanged on error.
    pub fn apply_changes(
        &mut self,
        changes: &BoardChanges,
        clock: &impl Clock,
    ) -> Result<(), WorkflowDomainError> {
        let name = changes
            .name
            .as_deref()
            .map(Self::validate_name)
            .transpose()?;
        let title = changes
            .title
            .as_deref()
            .map(|value| required_text("board title", value, BOARD_TITLE_MAX))
            .transpose()?;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}
