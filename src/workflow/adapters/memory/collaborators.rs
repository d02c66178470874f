//! In-memory stand-ins for collaborator services.

use crate::workflow::{
    domain::{AccountId, EmployeePosition, OrganizationId},
    ports::{
        DirectoryError, DirectoryResult, FileStorage, FileStorageError, Notification,
        NotificationChannel, NotificationError, OrganizationDirectory, UserDirectory,
    },
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

fn poisoned<T>(err: PoisonError<T>) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

/// Directory answering from fixed tables.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    employees: HashMap<(AccountId, OrganizationId), EmployeePosition>,
    organizations: HashMap<OrganizationId, String>,
    users: HashMap<AccountId, String>,
}

impl StaticDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an employee position.
    #[must_use]
    pub fn with_employee(
        mut self,
        account_id: AccountId,
        organization_id: OrganizationId,
        position: impl Into<String>,
    ) -> Self {
        self.employees
            .insert((account_id, organization_id), EmployeePosition::new(position));
        self
    }

    /// Registers an organization name.
    #[must_use]
    pub fn with_organization(
        mut self,
        organization_id: OrganizationId,
        name: impl Into<String>,
    ) -> Self {
        self.organizations.insert(organization_id, name.into());
        self
    }

    /// Registers a user display name.
    #[must_use]
    pub fn with_user(mut self, account_id: AccountId, name: impl Into<String>) -> Self {
        self.users.insert(account_id, name.into());
        self
    }
}

#[async_trait]
impl OrganizationDirectory for StaticDirectory {
    async fn employee_position(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
    ) -> DirectoryResult<EmployeePosition> {
        self.employees
            .get(&(account_id, organization_id))
            .cloned()
            .ok_or_else(|| {
                DirectoryError::NotFound(format!(
                    "employee {account_id} of organization {organization_id}"
                ))
            })
    }

    async fn organization_name(&self, organization_id: OrganizationId) -> DirectoryResult<String> {
        self.organizations
            .get(&organization_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("organization {organization_id}")))
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn display_name(&self, account_id: AccountId) -> DirectoryResult<String> {
        self.users
            .get(&account_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("user {account_id}")))
    }
}

/// Notification channel that records every message it accepts.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationChannel {
    sent: Arc<RwLock<Vec<Notification>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotificationChannel {
    /// Creates a channel that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .read()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationChannel for RecordingNotificationChannel {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::Rejected(
                "recording channel is set to fail".to_owned(),
            ));
        }
        self.sent
            .write()
            .map_err(|err| NotificationError::unavailable(poisoned(err)))?
            .push(notification.clone());
        Ok(())
    }
}

/// File storage keeping objects in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryFileStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an object is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .is_ok_and(|objects| objects.contains_key(key))
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, FileStorageError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{ext}"))
            .unwrap_or_default();
        let key = format!("{}{extension}", Uuid::new_v4().simple());
        self.objects
            .write()
            .map_err(|err| FileStorageError::unavailable(poisoned(err)))?
            .insert(key.clone(), bytes);
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), FileStorageError> {
        let removed = self
            .objects
            .write()
            .map_err(|err| FileStorageError::unavailable(poisoned(err)))?
            .remove(key);
        removed
            .map(|_| ())
            .ok_or_else(|| FileStorageError::Rejected(format!("no object stored under {key}")))
    }
}
