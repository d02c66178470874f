//! Shared world state for board workflow BDD scenarios.

use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use taskboard::workflow::{
    adapters::memory::{InMemoryWorkflowStore, StaticDirectory},
    domain::{AccountId, Board, CallerContext, OrganizationId, Task, TaskState},
    services::{BoardService, ProjectService, TaskService, TaskStateService, WorkflowError},
};

pub const ORGANIZATION: OrganizationId = OrganizationId::new(10);
pub const MANAGER: AccountId = AccountId::new(1);
pub const OWNER: AccountId = AccountId::new(2);

/// Scenario world for board workflow behaviour tests.
pub struct BoardWorld {
    pub projects: ProjectService<InMemoryWorkflowStore, StaticDirectory, DefaultClock>,
    pub boards: BoardService<InMemoryWorkflowStore, StaticDirectory, DefaultClock>,
    pub states: TaskStateService<InMemoryWorkflowStore, DefaultClock>,
    pub tasks: TaskService<InMemoryWorkflowStore, DefaultClock>,
    pub board: Option<Board>,
    pub task: Option<Task>,
    pub last_error: Option<WorkflowError>,
}

impl BoardWorld {
    /// Creates a world over an empty store and a two-person organization.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryWorkflowStore::new());
        let directory = Arc::new(
            StaticDirectory::new()
                .with_organization(ORGANIZATION, "Acme")
                .with_employee(MANAGER, ORGANIZATION, "ORG_ADMIN")
                .with_employee(OWNER, ORGANIZATION, "ORG_EMPLOYEE"),
        );
        let clock = Arc::new(DefaultClock);
        Self {
            projects: ProjectService::new(
                Arc::clone(&store),
                Arc::clone(&directory),
                Arc::clone(&clock),
            ),
            boards: BoardService::new(Arc::clone(&store), directory, Arc::clone(&clock)),
            states: TaskStateService::new(Arc::clone(&store), Arc::clone(&clock)),
            tasks: TaskService::new(store, clock),
            board: None,
            task: None,
            last_error: None,
        }
    }

    /// Returns the board created by a given step.
    ///
    /// # Errors
    ///
    /// Returns an error when no board has been created yet.
    pub fn board(&self) -> eyre::Result<&Board> {
        self.board
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing board in scenario world"))
    }

    /// Returns the task created by a given step.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> eyre::Result<&Task> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Loads the board's live states in position order.
    ///
    /// # Errors
    ///
    /// Returns an error when the board is missing or the lookup fails.
    pub fn current_states(&self) -> eyre::Result<Vec<TaskState>> {
        let board_id = self.board()?.id();
        let ordering = run_async(self.boards.states(board_id))?;
        Ok(ordering.into_states())
    }

    /// Finds a live state of the board by code.
    ///
    /// # Errors
    ///
    /// Returns an error when no state carries the code.
    pub fn state_by_code(&self, code: &str) -> eyre::Result<TaskState> {
        self.current_states()?
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or_else(|| eyre::eyre!("no state with code {code}"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

pub fn caller(account: AccountId) -> CallerContext {
    CallerContext::new(account).with_organization(ORGANIZATION)
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
