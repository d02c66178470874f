//! JSON request and response bodies.

use crate::workflow::{
    domain::{
        AccountId, AccountTask, AccountTaskId, Board, BoardId, MoveDirection, OrganizationId,
        Project, ProjectId, ReorderDirection, StateSwap, TaskAction, TaskActionId,
        TaskActionType, TaskFile, TaskFileId, TaskId, TaskState, TaskStateId,
    },
    ports::CascadeSummary,
    services::TaskView,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /projects`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /boards`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    /// Board name, unique within the project.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Parent project.
    pub project_id: ProjectId,
}

/// Body of `POST /task-states/{boardId}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertStateRequest {
    /// State name.
    pub name: String,
    /// State code.
    pub code: String,
    /// State after which to insert; head of the board when absent.
    #[serde(default)]
    pub prev_state_id: Option<TaskStateId>,
}

/// Body of `PUT /task-states/{id}/move`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderStateRequest {
    /// `UP` or `DOWN`.
    pub direction: ReorderDirection,
}

/// Body of `PUT /tasks/{id}/move`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveTaskRequest {
    /// `FORWARD` or `BACKWARD`.
    pub direction: MoveDirection,
}

/// Body of `PUT /tasks/{id}/state`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStateRequest {
    /// Target state code.
    pub code: String,
}

/// Body of `POST /account-tasks`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// Account to assign.
    pub account_id: AccountId,
    /// Task to assign to.
    pub task_id: TaskId,
}

/// Query of `DELETE /tasks/files/by-key`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteByKeyQuery {
    /// Storage key of the file.
    pub key_name: String,
    /// Task the file is attached to.
    pub task_id: TaskId,
}

/// Project representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    /// Identifier.
    pub id: ProjectId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id(),
            organization_id: project.organization_id(),
            name: project.name().to_owned(),
            description: project.description().map(str::to_owned),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }
}

/// Board representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    /// Identifier.
    pub id: BoardId,
    /// Parent project.
    pub project_id: ProjectId,
    /// Name.
    pub name: String,
    /// Title.
    pub title: String,
    /// Active flag.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Board> for BoardResponse {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id(),
            project_id: board.project_id(),
            name: board.name().to_owned(),
            title: board.title().to_owned(),
            active: board.is_active(),
            created_at: board.created_at(),
            updated_at: board.updated_at(),
        }
    }
}

/// Newly created board with its seeded states.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedBoardResponse {
    /// The board.
    #[serde(flatten)]
    pub board: BoardResponse,
    /// Seeded states in position order.
    pub states: Vec<TaskStateResponse>,
}

/// Task state representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStateResponse {
    /// Identifier.
    pub id: TaskStateId,
    /// Owning board.
    pub board_id: BoardId,
    /// Name.
    pub name: String,
    /// Code.
    pub code: String,
    /// One-based position.
    pub position: u32,
}

impl From<&TaskState> for TaskStateResponse {
    fn from(state: &TaskState) -> Self {
        Self {
            id: state.id(),
            board_id: state.board_id(),
            name: state.name().to_owned(),
            code: state.code().to_owned(),
            position: state.position().value(),
        }
    }
}

/// Both states touched by a reorder.
#[derive(Debug, Clone, Serialize)]
pub struct StateSwapResponse {
    /// The state that was asked to move.
    pub moved: TaskStateResponse,
    /// The neighbor that took its place.
    pub displaced: TaskStateResponse,
}

impl From<&StateSwap> for StateSwapResponse {
    fn from(swap: &StateSwap) -> Self {
        Self {
            moved: TaskStateResponse::from(&swap.moved),
            displaced: TaskStateResponse::from(&swap.displaced),
        }
    }
}

/// Task representation with assignees.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Identifier.
    pub id: TaskId,
    /// Owning board.
    pub board_id: BoardId,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Priority between one and five.
    pub priority: i32,
    /// Owning account.
    pub owner_id: AccountId,
    /// Current state.
    pub state_id: TaskStateId,
    /// Active assignees.
    pub assignees: Vec<AccountId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<&TaskView> for TaskResponse {
    fn from(view: &TaskView) -> Self {
        let task = &view.task;
        Self {
            id: task.id(),
            board_id: task.board_id(),
            name: task.name().to_owned(),
            description: task.description().to_owned(),
            due_date: task.due_date(),
            priority: task.priority().value(),
            owner_id: task.owner_id(),
            state_id: task.state_id(),
            assignees: view.assignees.clone(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Audit record representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskActionResponse {
    /// Identifier.
    pub id: TaskActionId,
    /// Task described.
    pub task_id: TaskId,
    /// Kind of mutation.
    pub action_type: TaskActionType,
    /// Acting account.
    pub actor_id: AccountId,
    /// Value before.
    pub old_value: Option<String>,
    /// Value after.
    pub new_value: Option<String>,
    /// Comment.
    pub comment: Option<String>,
    /// Recording time.
    pub created_at: DateTime<Utc>,
}

impl From<&TaskAction> for TaskActionResponse {
    fn from(action: &TaskAction) -> Self {
        Self {
            id: action.id(),
            task_id: action.task_id(),
            action_type: action.action_type(),
            actor_id: action.actor_id(),
            old_value: action.old_value().map(str::to_owned),
            new_value: action.new_value().map(str::to_owned),
            comment: action.comment().map(str::to_owned),
            created_at: action.created_at(),
        }
    }
}

/// Assignment representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    /// Identifier.
    pub id: AccountTaskId,
    /// Task.
    pub task_id: TaskId,
    /// Account.
    pub account_id: AccountId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&AccountTask> for AssignmentResponse {
    fn from(assignment: &AccountTask) -> Self {
        Self {
            id: assignment.id(),
            task_id: assignment.task_id(),
            account_id: assignment.account_id(),
            created_at: assignment.created_at(),
        }
    }
}

/// Task file representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFileResponse {
    /// Identifier.
    pub id: TaskFileId,
    /// Task.
    pub task_id: TaskId,
    /// Storage key.
    pub key_name: String,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}

impl From<&TaskFile> for TaskFileResponse {
    fn from(file: &TaskFile) -> Self {
        Self {
            id: file.id(),
            task_id: file.task_id(),
            key_name: file.key_name().to_owned(),
            created_at: file.created_at(),
        }
    }
}

/// Counts of rows trashed by a cascading delete.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CascadeResponse {
    /// Boards trashed.
    pub boards: usize,
    /// Tasks trashed.
    pub tasks: usize,
    /// Assignments trashed.
    pub assignments: usize,
}

impl From<CascadeSummary> for CascadeResponse {
    fn from(summary: CascadeSummary) -> Self {
        Self {
            boards: summary.boards,
            tasks: summary.tasks,
            assignments: summary.assignments,
        }
    }
}

/// Number of files removed at once.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RemovedFilesResponse {
    /// Files removed.
    pub removed: usize,
}

/// Converts a slice of domain values into response bodies.
pub(crate) fn list<'a, T, R>(items: &'a [T]) -> Vec<R>
where
    R: From<&'a T>,
{
    items.iter().map(R::from).collect()
}
