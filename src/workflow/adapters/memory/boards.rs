//! In-memory board repository.

use super::InMemoryWorkflowStore;
use crate::workflow::{
    domain::{Board, BoardId, Conflict, EntityRef, ProjectId, TaskState},
    ports::{
        BoardRepository, CascadeSummary, Visibility, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

fn name_clash<'a>(
    boards: impl Iterator<Item = &'a Board>,
    project_id: ProjectId,
    name: &str,
    except: Option<BoardId>,
) -> bool {
    boards
        .filter(|board| !board.is_deleted() && board.project_id() == project_id)
        .filter(|board| Some(board.id()) != except)
        .any(|board| board.name() == name)
}

#[async_trait]
impl BoardRepository for InMemoryWorkflowStore {
    async fn store_board(
        &self,
        board: &Board,
        states: &[TaskState],
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        if name_clash(state.boards.values(), board.project_id(), board.name(), None) {
            return Err(Conflict::BoardName(board.name().to_owned()).into());
        }
        state.boards.insert(board.id(), board.clone());
        state.save_states(states);
        Ok(())
    }

    async fn update_board(&self, board: &Board) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        let live = state
            .boards
            .get(&board.id())
            .is_some_and(|stored| !stored.is_deleted());
        if !live {
            return Err(WorkflowRepositoryError::NotFound(EntityRef::Board(
                board.id(),
            )));
        }
        if name_clash(
            state.boards.values(),
            board.project_id(),
            board.name(),
            Some(board.id()),
        ) {
            return Err(Conflict::BoardName(board.name().to_owned()).into());
        }
        state.boards.insert(board.id(), board.clone());
        Ok(())
    }

    async fn find_board(
        &self,
        id: BoardId,
        visibility: Visibility,
    ) -> WorkflowRepositoryResult<Option<Board>> {
        let state = self.read()?;
        Ok(state
            .boards
            .get(&id)
            .filter(|board| visibility.admits(board.is_deleted()))
            .cloned())
    }

    async fn list_boards(&self, project_id: ProjectId) -> WorkflowRepositoryResult<Vec<Board>> {
        let state = self.read()?;
        let mut boards: Vec<Board> = state
            .boards
            .values()
            .filter(|board| board.project_id() == project_id && !board.is_deleted())
            .cloned()
            .collect();
        boards.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(boards)
    }

    async fn list_all_boards(&self) -> WorkflowRepositoryResult<Vec<Board>> {
        let state = self.read()?;
        let mut boards: Vec<Board> = state
            .boards
            .values()
            .filter(|board| !board.is_deleted())
            .cloned()
            .collect();
        boards.sort_by(|left, right| {
            (left.project_id(), left.name()).cmp(&(right.project_id(), right.name()))
        });
        Ok(boards)
    }

    async fn board_name_taken(
        &self,
        project_id: ProjectId,
        name: &str,
        except: Option<BoardId>,
    ) -> WorkflowRepositoryResult<bool> {
        let state = self.read()?;
        Ok(name_clash(state.boards.values(), project_id, name, except))
    }

    async fn trash_board(
        &self,
        id: BoardId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary> {
        let mut state = self.write()?;
        let live = state.boards.get(&id).is_some_and(|board| !board.is_deleted());
        if !live {
            return Err(WorkflowRepositoryError::NotFound(EntityRef::Board(id)));
        }
        Ok(state.trash_board_cascade(id, at))
    }

    async fn trash_boards_by_project(
        &self,
        project_id: ProjectId,
        at: DateTime<Utc>,
    ) -> WorkflowRepositoryResult<CascadeSummary> {
        let mut state = self.write()?;
        let mut summary = CascadeSummary::default();
        for board_id in state.live_board_ids(project_id) {
            summary = summary.merge(state.trash_board_cascade(board_id, at));
        }
        Ok(summary)
    }
}
