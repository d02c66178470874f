//! Application services for the workflow engine.
//!
//! Services take an explicit [`CallerContext`](crate::workflow::domain::CallerContext),
//! enforce permissions, apply domain rules and persist changes through the
//! repository ports. Audit records are built here and stored by the
//! repository in the same transaction as the change they describe.

mod assignments;
mod boards;
mod error;
mod files;
mod notifications;
mod permissions;
mod projects;
mod states;
mod tasks;

pub use assignments::AssignmentService;
pub use boards::BoardService;
pub use error::{ForbiddenReason, WorkflowError, WorkflowResult};
pub use files::FileAttachmentService;
pub use notifications::{
    DeliveryError, DispatchReport, DispatchSettings, MessageContext, MessageTemplates,
    NotificationDispatcher, UNKNOWN_NAME,
};
pub use projects::{ProjectChanges, ProjectService};
pub use states::{TaskStateChanges, TaskStateService};
pub use tasks::{TaskDraft, TaskService, TaskView};
