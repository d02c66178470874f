//! Repository ports for workflow persistence.
//!
//! Each aggregate has its own trait. Mutations that describe a task change
//! take the matching [`TaskAction`] so that adapters persist the change, the
//! audit record and its notification outbox entry in one transaction.

use crate::workflow::domain::{
    AccountId, AccountTask, AccountTaskId, Board, BoardId, Conflict, EntityRef, ErrorKind, OrganizationId,
    Project, ProjectId, ReorderDirection, StateOrdering, StateSwap, Task, TaskAction,
    TaskActionId, TaskFile, TaskFileId, TaskId, TaskState, TaskStateId, TransitionTarget,
    WorkflowDomainError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow repository operations.
pub type WorkflowRepositoryResult<T> = Result<T, WorkflowRepositoryError>;

/// Whether a lookup may return soft-deleted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Only live rows.
    #[default]
    Active,
    /// Live and trashed rows, for audit and history lookups.
    IncludeArchived,
}

impl Visibility {
    /// Returns `true` when a row with the given delete flag is visible.
    #[must_use]
    pub const fn admits(self, deleted: bool) -> bool {
        match self {
            Self::Active => !deleted,
            Self::IncludeArchived => true,
        }
    }
}

/// Number of rows trashed by a cascading delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeSummary {
    /// Boards trashed.
    pub boards: usize,
    /// Tasks trashed.
    pub tasks: usize,
    /// Assignments trashed.
    pub assignments: usize,
}

impl CascadeSummary {
    /// Adds the counts of another summary.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            boards: self.boards.saturating_add(other.boards),
            tasks: self.tasks.saturating_add(other.tasks),
            assignments: self.assignments.saturating_add(other.assignments),
        }
    }
}

/// Audit record whose notification has not been delivered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    /// The audit record to announce.
    pub action: TaskAction,
    /// Delivery attempts made so far.
    pub attempts: u32,
}

/// A task after a state change together with the record describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionedTask {
    /// The task in its new state.
    pub task: Task,
    /// The appended record.
    pub action: TaskAction,
}

/// Project persistence contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Conflict`] when the name is already
    /// used by a live project of the same organization.
    async fn store_project(&self, project: &Project) -> WorkflowRepositoryResult<()>;

    /// Persists changes to an existing live project.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the project does not
    /// exist or is trashed.
    async fn update_project(&self, project: &Project) -> WorkflowRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_project(
        &self,
        id: ProjectId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Project>>;

    /// Lists live projects of an organization ordered by name.
    async fn list_projects(
        &self,
        organization_id: OrganizationId,
    ) -> WorkflowRepositoryResult<Vec<Project>>;

    /// Lists every live project ordered by organization, then name.
    async fn list_all_projects(&self) -> WorkflowRepositoryResult<Vec<Project>>;

    /// Returns `true` when another live project of the organization uses
    /// `name`.
    async fn project_name_taken(
        &self,
        organization_id: OrganizationId,
        name: &str,
        except: Option<ProjectId>,
    ) -> WorkflowRepositoryResult<bool>;

    /// Trashes a project together with its boards, their tasks and the
    /// tasks' assignments.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the project does not
    /// exist or is already trashed.
    async fn trash_project(
        &self,
        id: ProjectId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary>;
}

/// Board persistence contract.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a new board with its initial task states.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Conflict`] when the name is already
    /// used within the project.
    async fn store_board(&self, board: &Board, states: &[TaskState])
    -> WorkflowRepositoryResult<()>;

    /// Persists changes to an existing live board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the board does not
    /// exist or is trashed, or [`WorkflowRepositoryError::Conflict`] on a
    /// name clash.
    async fn update_board(&self, board: &Board) -> WorkflowRepositoryResult<()>;

    /// Finds a board by identifier.
    async fn find_board(
        &self,
        id: BoardId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Board>>;

    /// Lists live boards of a project ordered by name.
    async fn list_boards(&self, project_id: ProjectId) -> WorkflowRepositoryResult<Vec<Board>>;

    /// Lists every live board, whatever its project, ordered by project id
    /// and then name.
    async fn list_all_boards(&self) -> WorkflowRepositoryResult<Vec<Board>>;

    /// Returns `true` when another live board of the project uses `name`.
    async fn board_name_taken(
        &self,
        project_id: ProjectId,
        name: &str,
        except: Option<BoardId>,
    ) -> WorkflowRepositoryResult<bool>;

    /// Trashes the board's live assignments, then its live tasks, then the
    /// board. Task states are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the board does not
    /// exist or is already trashed.
    async fn trash_board(
        &self,
        id: BoardId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary>;

    /// Applies [`BoardRepository::trash_board`] to every live board of a
    /// project in one transaction.
    async fn trash_boards_by_project(
        &self,
        project_id: ProjectId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary>;
}

/// Task state persistence contract.
///
/// Position-changing operations serialize per board: adapters hold a board
/// level lock while they read the ordering, apply the change and write the
/// shifted rows.
#[async_trait]
pub trait TaskStateRepository: Send + Sync {
    /// Loads the live states of a board in position order.
    async fn board_states(&self, board_id: BoardId) -> WorkflowRepositoryResult<StateOrdering>;

    /// Finds a state by identifier.
    async fn find_task_state(
        &self,
        id: TaskStateId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<TaskState>>;

    /// Lists every live state grouped by board id, each board's states in
    /// position order.
    async fn list_all_task_states(&self) -> WorkflowRepositoryResult<Vec<TaskState>>;

    /// Inserts a state after `after`, or at the head of the board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Domain`] when `after` is not on the
    /// board or a name or code clashes.
    async fn insert_task_state(
        &self,
        board_id: BoardId,
        name: &str,
        code: &str,
        after: Option<TaskStateId>,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState>;

    /// Trashes a state and closes the position gap.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] for unknown states or
    /// [`WorkflowRepositoryError::Conflict`] when live tasks still sit in the
    /// state.
    async fn remove_task_state(
        &self,
        id: TaskStateId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState>;

    /// Renames a state and/or changes its code.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] for unknown states or
    /// [`WorkflowRepositoryError::Domain`] on invalid or clashing values.
    async fn rename_task_state(
        &self,
        id: TaskStateId,
        name: Option<&str>,
        code: Option<&str>,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TaskState>;

    /// Swaps a state with its neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] for unknown states or
    /// [`WorkflowRepositoryError::Domain`] at the board boundary.
    async fn reorder_task_state(
        &self,
        id: TaskStateId,
        direction: ReorderDirection,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<StateSwap>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its creation record.
    ///
    /// The board is locked against a concurrent delete while the task is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the board or the
    /// task's initial state is no longer live, and
    /// [`WorkflowRepositoryError::Conflict`] when the name is already used on
    /// the board.
    async fn store_task(&self, task: &Task, action: &TaskAction) -> WorkflowRepositoryResult<()>;

    /// Persists the editable fields of a task (name, description, due date,
    /// priority) together with the records describing them. The stored
    /// state is left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the task does not
    /// exist or is trashed, or [`WorkflowRepositoryError::Conflict`] on a
    /// name clash.
    async fn update_task(&self, task: &Task, actions: &[TaskAction])
    -> WorkflowRepositoryResult<()>;

    /// Moves a live task to the state chosen by `target` and appends the
    /// record describing the move.
    ///
    /// The board and the task stay locked from resolving `target` against
    /// the board's live states until the write, so concurrent state removals
    /// and moves are applied one after another.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the task does not
    /// exist or is trashed, and [`WorkflowRepositoryError::Domain`] when the
    /// target cannot be resolved.
    async fn transition_task(
        &self,
        id: TaskId,
        target: &TransitionTarget,
        actor_id: AccountId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<TransitionedTask>;

    /// Finds a task by identifier.
    async fn find_task(
        &self,
        id: TaskId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Task>>;

    /// Lists live tasks of a board ordered by creation time.
    async fn list_tasks(&self, board_id: BoardId) -> WorkflowRepositoryResult<Vec<Task>>;

    /// Returns `true` when another live task of the board uses `name`.
    async fn task_name_taken(
        &self,
        board_id: BoardId,
        name: &str,
        except: Option<TaskId>,
    ) -> WorkflowRepositoryResult<bool>;

    /// Trashes the task's live assignments, appends `action`, then trashes
    /// the task. Returns the number of assignments trashed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the task does not
    /// exist or is already trashed.
    async fn trash_task(
        &self,
        id: TaskId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<usize>;
}

/// Assignment persistence contract.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Stores a live assignment together with its record.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Conflict`] when the pair is already
    /// actively assigned.
    async fn store_assignment(
        &self,
        assignment: &AccountTask,
        action: &TaskAction,
    ) -> WorkflowRepositoryResult<()>;

    /// Trashes the live assignment of `account_id` to `task_id` together with
    /// appending its record.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when no live assignment
    /// exists.
    async fn trash_assignment(
        &self,
        task_id: TaskId,
        account_id: AccountId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()>;

    /// Finds an assignment row by identifier.
    async fn find_assignment(
        &self,
        id: AccountTaskId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<AccountTask>>;

    /// Returns `true` when the pair is actively assigned.
    async fn is_assigned(
        &self,
        task_id: TaskId,
        account_id: AccountId,
    ) -> WorkflowRepositoryResult<bool>;

    /// Lists accounts actively assigned to a task.
    async fn list_assignees(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<AccountId>>;

    /// Lists active assignees for several tasks at once.
    ///
    /// Tasks without assignees are absent from the map.
    async fn list_assignees_for_tasks(
        &self,
        task_ids: &[TaskId],
    ) -> WorkflowRepositoryResult<BTreeMap<TaskId, Vec<AccountId>>>;
}

/// Audit log and notification outbox contract.
#[async_trait]
pub trait TaskActionRepository: Send + Sync {
    /// Lists every record of a task, oldest first, including records of a
    /// trashed task.
    async fn list_actions(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<TaskAction>>;

    /// Returns undelivered records with fewer than `max_attempts` attempts,
    /// oldest first.
    async fn pending_notifications(
        &self,
        limit: usize,
        max_attempts: u32,
    ) -> WorkflowRepositoryResult<Vec<PendingNotification>>;

    /// Marks a record's notification as delivered.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when no outbox entry
    /// exists for the record.
    async fn mark_notification_dispatched(
        &self,
        action_id: TaskActionId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()>;

    /// Counts a failed delivery attempt and stores its error.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when no outbox entry
    /// exists for the record.
    async fn record_notification_failure(
        &self,
        action_id: TaskActionId,
        error: &str,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()>;
}

/// Task file persistence contract.
#[async_trait]
pub trait TaskFileRepository: Send + Sync {
    /// Stores a new task file together with its upload record.
    async fn store_task_file(
        &self,
        file: &TaskFile,
        action: &TaskAction,
    ) -> WorkflowRepositoryResult<()>;

    /// Finds a live task file by identifier.
    async fn find_task_file(&self, id: TaskFileId) -> WorkflowRepositoryResult<Option<TaskFile>>;

    /// Finds a live file of a task by storage key.
    async fn find_task_file_by_key(
        &self,
        task_id: TaskId,
        key_name: &str,
    ) -> WorkflowRepositoryResult<Option<TaskFile>>;

    /// Lists live files of a task, oldest first.
    async fn list_task_files(&self, task_id: TaskId) -> WorkflowRepositoryResult<Vec<TaskFile>>;

    /// Trashes one task file and appends its record.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the file does not
    /// exist or is already trashed.
    async fn trash_task_file(
        &self,
        id: TaskFileId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<()>;

    /// Trashes every live file of a task and appends one record. Returns the
    /// number of files trashed.
    async fn trash_task_files(
        &self,
        task_id: TaskId,
        action: &TaskAction,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<usize>;
}

/// Every workflow persistence port behind one bound.
pub trait WorkflowRepository:
    ProjectRepository
    + BoardRepository
    + TaskStateRepository
    + TaskRepository
    + AssignmentRepository
    + TaskActionRepository
    + TaskFileRepository
{
}

impl<T> WorkflowRepository for T where
    T: ProjectRepository
        + BoardRepository
        + TaskStateRepository
        + TaskRepository
        + AssignmentRepository
        + TaskActionRepository
        + TaskFileRepository
{
}

/// Errors returned by workflow repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowRepositoryError {
    /// The addressed entity does not exist or is trashed.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// A uniqueness rule rejected the write.
    #[error(transparent)]
    Conflict(#[from] Conflict),

    /// A domain rule rejected the change.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Domain(err) => err.kind(),
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(entity) => entity.code(),
            Self::Conflict(conflict) => conflict.code(),
            Self::Domain(err) => err.code(),
            Self::Persistence(_) => "INTERNAL_ERROR",
        }
    }
}
