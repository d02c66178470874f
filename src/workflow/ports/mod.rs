//! Port contracts for the workflow engine.
//!
//! Ports define infrastructure-agnostic interfaces used by workflow services:
//! persistence, the organization and user directories, the notification
//! channel and file storage.

pub mod directory;
pub mod file_store;
pub mod notifier;
pub mod repository;

pub use directory::{DirectoryError, DirectoryResult, OrganizationDirectory, UserDirectory};
pub use file_store::{FileStorage, FileStorageError};
pub use notifier::{Notification, NotificationChannel, NotificationError};
pub use repository::{
    AssignmentRepository, BoardRepository, CascadeSummary, PendingNotification,
    ProjectRepository, TaskActionRepository, TaskFileRepository, TaskRepository,
    TaskStateRepository, TransitionedTask, Visibility, WorkflowRepository,
    WorkflowRepositoryError, WorkflowRepositoryResult,
};
