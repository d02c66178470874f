//! Board lifecycle: creation with default states, partial update and
//! cascading delete.

use super::{
    error::{WorkflowError, WorkflowResult},
    permissions::require_manager,
};
use crate::workflow::{
    domain::{
        Board, BoardChanges, BoardId, CallerContext, Conflict, EntityRef, ProjectId,
        StateOrdering, TaskState,
    },
    ports::{CascadeSummary, OrganizationDirectory, Visibility, WorkflowRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Board lifecycle manager.
#[derive(Clone)]
pub struct BoardService<R, D, C>
where
    R: WorkflowRepository,
    D: OrganizationDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> BoardService<R, D, C>
where
    R: WorkflowRepository,
    D: OrganizationDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(repository: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            clock,
        }
    }

    /// Creates a board and seeds the default workflow after its last state.
    ///
    /// Returns the board with its seeded states in position order.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the project is missing and a
    /// conflict when the name is already used in the project.
    pub async fn create(
        &self,
        caller: &CallerContext,
        project_id: ProjectId,
        name: &str,
        title: &str,
    ) -> WorkflowResult<(Board, Vec<TaskState>)> {
        require_manager(&*self.directory, caller).await?;
        self.ensure_project(project_id).await?;

        let board = Board::new(project_id, name, title, &*self.clock)?;
        if self
            .repository
            .board_name_taken(project_id, board.name(), None)
            .await?
        {
            return Err(Conflict::BoardName(board.name().to_owned()).into());
        }

        let mut ordering = self.repository.board_states(board.id()).await?;
        ordering.append_defaults(self.clock.utc())?;
        let states = ordering.into_states();
        self.repository.store_board(&board, &states).await?;

        tracing::info!(
            board_id = %board.id(),
            project_id = %project_id,
            states = states.len(),
            "board created"
        );
        Ok((board, states))
    }

    /// Fetches a live board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the board does not exist or is
    /// trashed.
    pub async fn get(&self, id: BoardId) -> WorkflowResult<Board> {
        self.repository
            .find_board(id, Visibility::Active)
            .await?
            .ok_or(WorkflowError::NotFound(EntityRef::Board(id)))
    }

    /// Lists the live boards of a project ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the project is missing.
    pub async fn list_by_project(&self, project_id: ProjectId) -> WorkflowResult<Vec<Board>> {
        self.ensure_project(project_id).await?;
        Ok(self.repository.list_boards(project_id).await?)
    }

    /// Lists every live board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the lookup fails.
    pub async fn list_all(&self) -> WorkflowResult<Vec<Board>> {
        Ok(self.repository.list_all_boards().await?)
    }

    /// Returns the board's live states in position order.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] when the board is missing.
    pub async fn states(&self, id: BoardId) -> WorkflowResult<StateOrdering> {
        self.get(id).await?;
        Ok(self.repository.board_states(id).await?)
    }

    /// Applies a partial update to a board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown boards and a conflict
    /// when the new name is already used in the project.
    pub async fn update(
        &self,
        caller: &CallerContext,
        id: BoardId,
        changes: &BoardChanges,
    ) -> WorkflowResult<Board> {
        require_manager(&*self.directory, caller).await?;
        let mut board = self.get(id).await?;

        if let Some(new_name) = changes.name.as_deref() {
            let validated = Board::validate_name(new_name)?;
            if validated != board.name()
                && self
                    .repository
                    .board_name_taken(board.project_id(), &validated, Some(id))
                    .await?
            {
                return Err(Conflict::BoardName(validated).into());
            }
        }
        board.apply_changes(changes, &*self.clock)?;
        self.repository.update_board(&board).await?;
        Ok(board)
    }

    /// Trashes a board's assignments, then its tasks, then the board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] for unknown boards.
    pub async fn delete(
        &self,
        caller: &CallerContext,
        id: BoardId,
    ) -> WorkflowResult<CascadeSummary> {
        require_manager(&*self.directory, caller).await?;
        self.get(id).await?;
        let summary = self.repository.trash_board(id, self.clock.utc()).await?;
        tracing::info!(
            board_id = %id,
            tasks = summary.tasks,
            assignments = summary.assignments,
            "board deleted"
        );
        Ok(summary)
    }

    /// Trashes every live board of a project the way [`Self::delete`] does.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when persistence fails.
    pub async fn delete_by_project(&self, project_id: ProjectId) -> WorkflowResult<CascadeSummary> {
        Ok(self
            .repository
            .trash_boards_by_project(project_id, self.clock.utc())
            .await?)
    }

    async fn ensure_project(&self, project_id: ProjectId) -> WorkflowResult<()> {
        self.repository
            .find_project(project_id, Visibility::Active)
            .await?
            .map(|_| ())
            .ok_or(WorkflowError::NotFound(EntityRef::Project(project_id)))
    }
}
