//! Runs the taskboard HTTP service and its notification dispatcher.
//!
//! Configuration is read from the TOML file named by `TASKBOARD_CONFIG`
//! (when set) and then overridden by `TASKBOARD_*` environment variables.
//! The schema in `migrations/` must already be applied to the database.

use diesel::{
    PgConnection,
    r2d2::{ConnectionManager, Pool},
};
use mockable::DefaultClock;
use std::sync::Arc;
use taskboard::{
    api::{self, AppState, PostgresBackend},
    config::ServiceConfig,
    telemetry,
    workflow::{
        adapters::{
            http::{
                CollaboratorClient, HttpFileStorage, HttpNotificationChannel,
                HttpOrganizationDirectory, HttpUserDirectory,
            },
            postgres::PostgresWorkflowRepository,
        },
        services::NotificationDispatcher,
    },
};
use tokio::{net::TcpListener, sync::watch};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    telemetry::init();
    let config = ServiceConfig::load()?;

    let manager = ConnectionManager::<PgConnection>::new(config.database.url.as_str());
    let pool = Pool::builder()
        .max_size(config.database.pool_size)
        .build(manager)?;
    let repository = Arc::new(PostgresWorkflowRepository::new(pool));
    let clock = Arc::new(DefaultClock);

    let collaborators = &config.collaborators;
    let timeout = collaborators.request_timeout();
    let organizations = Arc::new(HttpOrganizationDirectory::new(CollaboratorClient::new(
        collaborators.organization_url.as_str(),
        timeout,
    )?));
    let users = Arc::new(HttpUserDirectory::new(CollaboratorClient::new(
        collaborators.auth_url.as_str(),
        timeout,
    )?));
    let notifier = Arc::new(HttpNotificationChannel::new(CollaboratorClient::new(
        collaborators.notification_url.as_str(),
        timeout,
    )?));
    let storage = Arc::new(HttpFileStorage::new(CollaboratorClient::new(
        collaborators.file_url.as_str(),
        timeout,
    )?));

    let dispatcher = NotificationDispatcher::new(
        Arc::clone(&repository),
        Arc::clone(&organizations),
        users,
        notifier,
        Arc::clone(&clock),
    )
    .with_settings(config.dispatcher.settings())
    .with_templates(config.dispatcher.templates());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher_task = tokio::spawn(async move { dispatcher.run(shutdown_rx).await });

    let state = AppState::<PostgresBackend>::new(repository, organizations, storage, clock);
    let listener = TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "taskboard listening");

    let served = axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if shutdown_tx.send(true).is_err() {
        tracing::debug!("dispatcher already stopped");
    }
    if let Err(err) = dispatcher_task.await {
        tracing::warn!(error = %err, "dispatcher task ended abnormally");
    }
    served?;
    tracing::info!("taskboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(err) => tracing::warn!(error = %err, "failed to listen for ctrl-c"),
    }
}
