//! Port for the outbound notification channel.

use crate::workflow::domain::{AccountId, TaskId};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Rendered message addressed to the people involved in a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Task the message is about.
    pub task_id: TaskId,
    /// Owner of the task.
    pub owner_id: AccountId,
    /// Deduplicated recipients.
    pub recipients: Vec<AccountId>,
    /// Human-readable text.
    pub content: String,
}

/// Delivers rendered notifications.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Sends one notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when the channel rejects the message or
    /// cannot be reached.
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Errors returned by notification channels.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The channel answered with a rejection.
    #[error("notification rejected: {0}")]
    Rejected(String),

    /// The channel could not be reached.
    #[error("notification channel unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
