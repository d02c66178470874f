//! Diesel row models for workflow persistence and their domain mappings.

use super::schema::{
    account_tasks, boards, notification_outbox, projects, task_actions, task_files, task_states,
    tasks,
};
use crate::workflow::{
    domain::{
        AccountId, AccountTask, AccountTaskId, Board, BoardId, OrganizationId,
        PersistedAccountTaskData, PersistedBoardData, PersistedProjectData,
        PersistedTaskActionData, PersistedTaskData, PersistedTaskFileData, PersistedTaskStateData,
        Priority, Project, ProjectId, StatePosition, Task, TaskAction, TaskActionId,
        TaskActionType, TaskFile, TaskFileId, TaskId, TaskState, TaskStateId,
    },
    ports::{WorkflowRepositoryError, WorkflowRepositoryResult},
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Project row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProjectRow {
    pub id: Uuid,
    pub organization_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    pub fn from_domain(project: &Project) -> Self {
        Self {
            id: project.id().into_inner(),
            organization_id: project.organization_id().value(),
            name: project.name().to_owned(),
            description: project.description().map(str::to_owned),
            deleted: project.is_deleted(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }

    pub fn into_domain(self) -> Project {
        Project::from_persisted(PersistedProjectData {
            id: ProjectId::from_uuid(self.id),
            organization_id: OrganizationId::new(self.organization_id),
            name: self.name,
            description: self.description,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Board row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub title: String,
    pub active: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardRow {
    pub fn from_domain(board: &Board) -> Self {
        Self {
            id: board.id().into_inner(),
            project_id: board.project_id().into_inner(),
            name: board.name().to_owned(),
            title: board.title().to_owned(),
            active: board.is_active(),
            deleted: board.is_deleted(),
            created_at: board.created_at(),
            updated_at: board.updated_at(),
        }
    }

    pub fn into_domain(self) -> Board {
        Board::from_persisted(PersistedBoardData {
            id: BoardId::from_uuid(self.id),
            project_id: ProjectId::from_uuid(self.project_id),
            name: self.name,
            title: self.title,
            active: self.active,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Task state row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskStateRow {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub code: String,
    pub position: i32,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskStateRow {
    pub fn from_domain(state: &TaskState) -> Self {
        Self {
            id: state.id().into_inner(),
            board_id: state.board_id().into_inner(),
            name: state.name().to_owned(),
            code: state.code().to_owned(),
            position: state.position().as_stored(),
            deleted: state.is_deleted(),
            created_at: state.created_at(),
            updated_at: state.updated_at(),
        }
    }

    pub fn into_domain(self) -> WorkflowRepositoryResult<TaskState> {
        Ok(TaskState::from_persisted(PersistedTaskStateData {
            id: TaskStateId::from_uuid(self.id),
            board_id: BoardId::from_uuid(self.board_id),
            name: self.name,
            code: self.code,
            position: StatePosition::from_stored(self.position)?,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Task row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: i32,
    pub owner_id: i64,
    pub state_id: Uuid,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    pub fn from_domain(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            board_id: task.board_id().into_inner(),
            name: task.name().to_owned(),
            description: task.description().to_owned(),
            due_date: task.due_date(),
            priority: task.priority().value(),
            owner_id: task.owner_id().value(),
            state_id: task.state_id().into_inner(),
            deleted: task.is_deleted(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }

    pub fn into_domain(self) -> WorkflowRepositoryResult<Task> {
        Ok(Task::from_persisted(PersistedTaskData {
            id: TaskId::from_uuid(self.id),
            board_id: BoardId::from_uuid(self.board_id),
            name: self.name,
            description: self.description,
            due_date: self.due_date,
            priority: Priority::new(self.priority)?,
            owner_id: AccountId::new(self.owner_id),
            state_id: TaskStateId::from_uuid(self.state_id),
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Assignment row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = account_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountTaskRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub account_id: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountTaskRow {
    pub fn from_domain(assignment: &AccountTask) -> Self {
        Self {
            id: assignment.id().into_inner(),
            task_id: assignment.task_id().into_inner(),
            account_id: assignment.account_id().value(),
            deleted: assignment.is_deleted(),
            created_at: assignment.created_at(),
            updated_at: assignment.updated_at(),
        }
    }

    pub const fn into_domain(self) -> AccountTask {
        AccountTask::from_persisted(PersistedAccountTaskData {
            id: AccountTaskId::from_uuid(self.id),
            task_id: TaskId::from_uuid(self.task_id),
            account_id: AccountId::new(self.account_id),
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Audit record row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_actions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskActionRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub action_type: String,
    pub actor_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TaskActionRow {
    pub fn from_domain(action: &TaskAction) -> Self {
        Self {
            id: action.id().into_inner(),
            task_id: action.task_id().into_inner(),
            action_type: action.action_type().as_str().to_owned(),
            actor_id: action.actor_id().value(),
            old_value: action.old_value().map(str::to_owned),
            new_value: action.new_value().map(str::to_owned),
            comment: action.comment().map(str::to_owned),
            created_at: action.created_at(),
        }
    }

    pub fn into_domain(self) -> WorkflowRepositoryResult<TaskAction> {
        let action_type = TaskActionType::try_from(self.action_type.as_str())
            .map_err(WorkflowRepositoryError::persistence)?;
        Ok(TaskAction::from_persisted(PersistedTaskActionData {
            id: TaskActionId::from_uuid(self.id),
            task_id: TaskId::from_uuid(self.task_id),
            action_type,
            actor_id: AccountId::new(self.actor_id),
            old_value: self.old_value,
            new_value: self.new_value,
            comment: self.comment,
            created_at: self.created_at,
        }))
    }
}

/// Outbox row written alongside every audit record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notification_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxRow {
    pub action_id: Uuid,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboxRow {
    pub const fn pending(action: &TaskActionRow) -> Self {
        Self {
            action_id: action.id,
            attempts: 0,
            last_error: None,
            dispatched_at: None,
            created_at: action.created_at,
            updated_at: action.created_at,
        }
    }
}

/// Task file row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskFileRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub key_name: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskFileRow {
    pub fn from_domain(file: &TaskFile) -> Self {
        Self {
            id: file.id().into_inner(),
            task_id: file.task_id().into_inner(),
            key_name: file.key_name().to_owned(),
            deleted: file.is_deleted(),
            created_at: file.created_at(),
            updated_at: file.updated_at(),
        }
    }

    pub fn into_domain(self) -> TaskFile {
        TaskFile::from_persisted(PersistedTaskFileData {
            id: TaskFileId::from_uuid(self.id),
            task_id: TaskId::from_uuid(self.task_id),
            key_name: self.key_name,
            deleted: self.deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
