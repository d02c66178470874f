//! Notification service client.

use super::CollaboratorClient;
use crate::workflow::{
    domain::AccountId,
    ports::{Notification, NotificationChannel, NotificationError},
};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    task_id: Uuid,
    owner_id: i64,
    content: &'a str,
    employees: Vec<i64>,
}

/// Sends notifications through the notification service.
#[derive(Debug, Clone)]
pub struct HttpNotificationChannel {
    client: CollaboratorClient,
}

impl HttpNotificationChannel {
    /// Creates a channel backed by the notification service.
    #[must_use]
    pub const fn new(client: CollaboratorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationChannel for HttpNotificationChannel {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let request = SendRequest {
            task_id: notification.task_id.into_inner(),
            owner_id: notification.owner_id.value(),
            content: &notification.content,
            employees: notification
                .recipients
                .iter()
                .copied()
                .map(AccountId::value)
                .collect(),
        };
        let response = self
            .client
            .http()
            .post(self.client.url("notification/send"))
            .json(&request)
            .send()
            .await
            .map_err(NotificationError::unavailable)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = response.text().await.unwrap_or_default();
        Err(NotificationError::Rejected(format!("{status}: {detail}")))
    }
}
