//! Outbox dispatcher turning audit records into notifications.
//!
//! Task mutations only append audit records; each record enqueues an outbox
//! entry in the same transaction. The dispatcher polls those entries,
//! renders a message for each and hands it to the notification channel.
//! Delivery is at-least-once: a crash between sending and marking the entry
//! dispatched sends the message again on the next poll.

use crate::workflow::{
    domain::{AccountId, EntityRef, TaskAction, TaskActionType},
    ports::{
        Notification, NotificationChannel, NotificationError, OrganizationDirectory,
        UserDirectory, Visibility, WorkflowRepository, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};
use minijinja::Environment;
use mockable::Clock;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Text substituted when a display name cannot be resolved.
pub const UNKNOWN_NAME: &str = "unknown";

const DEFAULT_LAYOUT: &str =
    "[{{ organization }}] {{ project }}\n{{ actor }} {{ body }}: {{ task }}";

/// minijinja templates used to render notification text.
///
/// The layout sees `organization`, `project`, `actor`, `task`, `action`,
/// `old`, `new`, `comment` and the rendered per-action `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    layout: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.to_owned(),
        }
    }
}

impl MessageTemplates {
    /// Replaces the outer layout.
    #[must_use]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Renders the message for one audit record.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when a template fails to render.
    pub fn render(&self, context: &MessageContext<'_>) -> Result<String, minijinja::Error> {
        let environment = Environment::new();
        let body = environment.render_str(body_template(context.action_type), context)?;
        let outer = LayoutContext {
            message: context,
            body,
        };
        environment.render_str(&self.layout, outer)
    }
}

const fn body_template(action_type: TaskActionType) -> &'static str {
    match action_type {
        TaskActionType::Created => "created the task",
        TaskActionType::Updated => {
            "updated the task{% if old and new %} ({{ old }} -> {{ new }}){% endif %}"
        }
        TaskActionType::MovedForward => "moved the task forward from {{ old }} to {{ new }}",
        TaskActionType::MovedBackward => "moved the task back from {{ old }} to {{ new }}",
        TaskActionType::Assigned => "assigned account {{ new }} to the task",
        TaskActionType::Unassigned => "removed account {{ old }} from the task",
        TaskActionType::Deleted => "deleted the task",
        TaskActionType::FileUploaded => "attached file {{ new }} to the task",
        TaskActionType::FileDeleted => "removed file {{ old }} from the task",
        TaskActionType::TaskAllFilesDeleted => "removed every file from the task",
    }
}

/// Values available to notification templates.
#[derive(Debug, Clone, Serialize)]
pub struct MessageContext<'a> {
    /// Organization display name.
    pub organization: &'a str,
    /// Project name.
    pub project: &'a str,
    /// Acting account's display name.
    pub actor: &'a str,
    /// Task name.
    pub task: &'a str,
    /// Action type as stored.
    pub action: &'static str,
    /// Value before the mutation.
    pub old: Option<&'a str>,
    /// Value after the mutation.
    pub new: Option<&'a str>,
    /// Free-text comment.
    pub comment: Option<&'a str>,
    #[serde(skip)]
    action_type: TaskActionType,
}

impl<'a> MessageContext<'a> {
    /// Builds the context for `action`.
    #[must_use]
    pub fn new(
        action: &'a TaskAction,
        organization: &'a str,
        project: &'a str,
        actor: &'a str,
        task: &'a str,
    ) -> Self {
        Self {
            organization,
            project,
            actor,
            task,
            action: action.action_type().as_str(),
            old: action.old_value(),
            new: action.new_value(),
            comment: action.comment(),
            action_type: action.action_type(),
        }
    }
}

#[derive(Serialize)]
struct LayoutContext<'a, 'b> {
    #[serde(flatten)]
    message: &'b MessageContext<'a>,
    body: String,
}

/// Polling and retry settings for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Entries fetched per poll.
    pub batch_size: usize,
    /// Entries with this many failed attempts are no longer retried.
    pub max_attempts: u32,
    /// Delay between polls.
    pub poll_interval: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_attempts: 5,
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Entries delivered and marked dispatched.
    pub delivered: usize,
    /// Entries whose delivery failed this pass.
    pub failed: usize,
}

impl DispatchReport {
    /// Returns `true` when the pass found nothing to do.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.delivered == 0 && self.failed == 0
    }
}

/// Reasons a single notification could not be delivered.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The task, board or project behind the record is gone.
    #[error("cannot resolve {0} for notification")]
    MissingContext(EntityRef),

    /// Loading the context failed.
    #[error(transparent)]
    Repository(#[from] WorkflowRepositoryError),

    /// A template failed to render.
    #[error("notification template failed: {0}")]
    Render(String),

    /// The channel refused or could not be reached.
    #[error(transparent)]
    Channel(#[from] NotificationError),
}

/// Delivers pending outbox entries through the notification channel.
pub struct NotificationDispatcher<R, O, U, N, C>
where
    R: WorkflowRepository,
    O: OrganizationDirectory,
    U: UserDirectory,
    N: NotificationChannel,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    organizations: Arc<O>,
    users: Arc<U>,
    channel: Arc<N>,
    clock: Arc<C>,
    templates: MessageTemplates,
    settings: DispatchSettings,
}

impl<R, O, U, N, C> NotificationDispatcher<R, O, U, N, C>
where
    R: WorkflowRepository,
    O: OrganizationDirectory,
    U: UserDirectory,
    N: NotificationChannel,
    C: Clock + Send + Sync,
{
    /// Creates a dispatcher with default templates and settings.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        organizations: Arc<O>,
        users: Arc<U>,
        channel: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            organizations,
            users,
            channel,
            clock,
            templates: MessageTemplates::default(),
            settings: DispatchSettings::default(),
        }
    }

    /// Replaces the message templates.
    #[must_use]
    pub fn with_templates(mut self, templates: MessageTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Replaces the polling settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attempts delivery of one batch of pending entries.
    ///
    /// Each entry is marked dispatched on success; on failure its attempt
    /// counter grows and the error is stored.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError`] when the outbox itself cannot be
    /// read or updated.
    pub async fn dispatch_pending(&self) -> WorkflowRepositoryResult<DispatchReport> {
        let pending = self
            .repository
            .pending_notifications(self.settings.batch_size, self.settings.max_attempts)
            .await?;

        let mut report = DispatchReport::default();
        for entry in pending {
            let action_id = entry.action.id();
            match self.deliver(&entry.action).await {
                Ok(()) => {
                    self.repository
                        .mark_notification_dispatched(action_id, self.clock.utc())
                        .await?;
                    report.delivered = report.delivered.saturating_add(1);
                }
                Err(err) => {
                    tracing::warn!(
                        action_id = %action_id,
                        attempt = entry.attempts.saturating_add(1),
                        error = %err,
                        "notification delivery failed"
                    );
                    self.repository
                        .record_notification_failure(action_id, &err.to_string(), self.clock.utc())
                        .await?;
                    report.failed = report.failed.saturating_add(1);
                }
            }
        }
        Ok(report)
    }

    /// Polls until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            interval_ms = self.settings.poll_interval.as_millis(),
            batch_size = self.settings.batch_size,
            "notification dispatcher started"
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => match self.dispatch_pending().await {
                    Ok(report) if report.is_empty() => {}
                    Ok(report) => tracing::debug!(
                        delivered = report.delivered,
                        failed = report.failed,
                        "notification batch processed"
                    ),
                    Err(err) => tracing::error!(error = %err, "notification outbox unavailable"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("notification dispatcher stopped");
    }

    async fn deliver(&self, action: &TaskAction) -> Result<(), DeliveryError> {
        let notification = self.compose(action).await?;
        self.channel.send(&notification).await?;
        Ok(())
    }

    /// Resolves context and renders the notification for one record.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::MissingContext`] when the task, board or
    /// project no longer exists even as an archived row.
    pub async fn compose(&self, action: &TaskAction) -> Result<Notification, DeliveryError> {
        let task_id = action.task_id();
        let task = self
            .repository
            .find_task(task_id, Visibility::IncludeArchived)
            .await?
            .ok_or(DeliveryError::MissingContext(EntityRef::Task(task_id)))?;
        let board = self
            .repository
            .find_board(task.board_id(), Visibility::IncludeArchived)
            .await?
            .ok_or(DeliveryError::MissingContext(EntityRef::Board(task.board_id())))?;
        let project = self
            .repository
            .find_project(board.project_id(), Visibility::IncludeArchived)
            .await?
            .ok_or(DeliveryError::MissingContext(EntityRef::Project(
                board.project_id(),
            )))?;

        let organization = self
            .organizations
            .organization_name(project.organization_id())
            .await
            .unwrap_or_else(|err| {
                tracing::debug!(error = %err, "organization name unavailable");
                UNKNOWN_NAME.to_owned()
            });
        let actor = self
            .users
            .display_name(action.actor_id())
            .await
            .unwrap_or_else(|err| {
                tracing::debug!(error = %err, "actor name unavailable");
                UNKNOWN_NAME.to_owned()
            });

        let context = MessageContext::new(action, &organization, project.name(), &actor, task.name());
        let content = self
            .templates
            .render(&context)
            .map_err(|err| DeliveryError::Render(err.to_string()))?;

        let assignees = self.repository.list_assignees(task_id).await?;
        Ok(Notification {
            task_id,
            owner_id: task.owner_id(),
            recipients: recipients(task.owner_id(), assignees),
            content,
        })
    }
}

/// Owner first, then assignees in id order, without duplicates.
fn recipients(owner_id: AccountId, assignees: Vec<AccountId>) -> Vec<AccountId> {
    let others: BTreeSet<AccountId> = assignees
        .into_iter()
        .filter(|account| *account != owner_id)
        .collect();
    std::iter::once(owner_id).chain(others).collect()
}
