//! Shared application state for HTTP handlers.

use crate::workflow::{
    adapters::{
        http::{HttpFileStorage, HttpOrganizationDirectory},
        memory::{InMemoryFileStorage, InMemoryWorkflowStore, StaticDirectory},
        postgres::PostgresWorkflowRepository,
    },
    ports::{FileStorage, OrganizationDirectory, WorkflowRepository},
    services::{
        AssignmentService, BoardService, FileAttachmentService, ProjectService, TaskService,
        TaskStateService,
    },
};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Selects the adapter types the HTTP surface runs on.
pub trait WorkflowBackend: Send + Sync + 'static {
    /// Persistence adapter.
    type Repository: WorkflowRepository + 'static;
    /// Organization directory used for permission checks.
    type Directory: OrganizationDirectory + 'static;
    /// File-storage collaborator.
    type Storage: FileStorage + 'static;
    /// Time source.
    type Clock: Clock + Send + Sync + 'static;
}

/// Production wiring: PostgreSQL plus HTTP collaborators.
#[derive(Debug, Clone, Copy)]
pub struct PostgresBackend;

impl WorkflowBackend for PostgresBackend {
    type Repository = PostgresWorkflowRepository;
    type Directory = HttpOrganizationDirectory;
    type Storage = HttpFileStorage;
    type Clock = DefaultClock;
}

/// In-process wiring for tests and local experiments.
#[derive(Debug, Clone, Copy)]
pub struct InMemoryBackend;

impl WorkflowBackend for InMemoryBackend {
    type Repository = InMemoryWorkflowStore;
    type Directory = StaticDirectory;
    type Storage = InMemoryFileStorage;
    type Clock = DefaultClock;
}

type Repo<B> = <B as WorkflowBackend>::Repository;
type Dir<B> = <B as WorkflowBackend>::Directory;
type Store<B> = <B as WorkflowBackend>::Storage;
type Time<B> = <B as WorkflowBackend>::Clock;

struct Services<B: WorkflowBackend> {
    projects: ProjectService<Repo<B>, Dir<B>, Time<B>>,
    boards: BoardService<Repo<B>, Dir<B>, Time<B>>,
    states: TaskStateService<Repo<B>, Time<B>>,
    tasks: TaskService<Repo<B>, Time<B>>,
    assignments: AssignmentService<Repo<B>, Dir<B>, Time<B>>,
    files: FileAttachmentService<Repo<B>, Store<B>, Time<B>>,
}

/// Workflow services shared by every request.
pub struct AppState<B: WorkflowBackend> {
    services: Arc<Services<B>>,
}

impl<B: WorkflowBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            services: Arc::clone(&self.services),
        }
    }
}

impl<B: WorkflowBackend> AppState<B> {
    /// Builds every service over the given adapters.
    #[must_use]
    pub fn new(
        repository: Arc<Repo<B>>,
        directory: Arc<Dir<B>>,
        storage: Arc<Store<B>>,
        clock: Arc<Time<B>>,
    ) -> Self {
        let services = Services {
            projects: ProjectService::new(
                Arc::clone(&repository),
                Arc::clone(&directory),
                Arc::clone(&clock),
            ),
            boards: BoardService::new(
                Arc::clone(&repository),
                Arc::clone(&directory),
                Arc::clone(&clock),
            ),
            states: TaskStateService::new(Arc::clone(&repository), Arc::clone(&clock)),
            tasks: TaskService::new(Arc::clone(&repository), Arc::clone(&clock)),
            assignments: AssignmentService::new(
                Arc::clone(&repository),
                directory,
                Arc::clone(&clock),
            ),
            files: FileAttachmentService::new(repository, storage, clock),
        };
        Self {
            services: Arc::new(services),
        }
    }

    /// Project catalogue.
    #[must_use]
    pub fn projects(&self) -> &ProjectService<Repo<B>, Dir<B>, Time<B>> {
        &self.services.projects
    }

    /// Board lifecycle.
    #[must_use]
    pub fn boards(&self) -> &BoardService<Repo<B>, Dir<B>, Time<B>> {
        &self.services.boards
    }

    /// Task state ordering.
    #[must_use]
    pub fn states(&self) -> &TaskStateService<Repo<B>, Time<B>> {
        &self.services.states
    }

    /// Task lifecycle.
    #[must_use]
    pub fn tasks(&self) -> &TaskService<Repo<B>, Time<B>> {
        &self.services.tasks
    }

    /// Assignment ledger.
    #[must_use]
    pub fn assignments(&self) -> &AssignmentService<Repo<B>, Dir<B>, Time<B>> {
        &self.services.assignments
    }

    /// File attachments.
    #[must_use]
    pub fn files(&self) -> &FileAttachmentService<Repo<B>, Store<B>, Time<B>> {
        &self.services.files
    }
}
