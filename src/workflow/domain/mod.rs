//! Domain model for the kanban workflow.
//!
//! Projects group boards; each board owns an ordered sequence of task states
//! and tasks that occupy exactly one of them. Assignments and audit records
//! hang off tasks. Everything here is pure: persistence, collaborator lookups
//! and notification delivery live outside the domain boundary.

mod action;
mod assignment;
mod board;
mod caller;
mod error;
pub mod fields;
mod file;
mod ids;
mod ordering;
mod project;
mod task;
mod task_state;

pub use action::{PersistedTaskActionData, TaskAction, TaskActionType};
pub use assignment::{AccountTask, PersistedAccountTaskData};
pub use board::{Board, BoardChanges, PersistedBoardData};
pub use caller::{CallerContext, EmployeePosition};
pub use error::{Conflict, EntityRef, ErrorKind, ParseWorkflowValueError, WorkflowDomainError};
pub use file::{PersistedTaskFileData, TaskFile};
pub use ids::{
    AccountId, AccountTaskId, BoardId, OrganizationId, ProjectId, TaskActionId, TaskFileId,
    TaskId, TaskStateId,
};
pub use ordering::{
    NeighborDirection, StateInsertion, StateOrdering, StateRemoval, StateSwap, StateTransition,
    TransitionTarget,
};
pub use project::{PersistedProjectData, Project};
pub use task::{FieldChange, MoveDirection, NewTask, PersistedTaskData, Priority, Task, TaskChanges};
pub use task_state::{
    DEFAULT_STATE_CODES, INITIAL_STATE_CODE, PersistedTaskStateData, ReorderDirection,
    StatePosition, TaskState,
};
