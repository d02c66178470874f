//! Organization and auth service clients.

use super::CollaboratorClient;
use crate::workflow::{
    domain::{AccountId, EmployeePosition, OrganizationId},
    ports::{DirectoryError, DirectoryResult, OrganizationDirectory, UserDirectory},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeLookup {
    user_id: i64,
    org_id: i64,
}

#[derive(Debug, Deserialize)]
struct EmployeeBody {
    position: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationBody {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserBody {
    full_name: String,
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    subject: impl FnOnce() -> String,
) -> DirectoryResult<T> {
    if response.status() == StatusCode::NOT_FOUND {
        return Err(DirectoryError::NotFound(subject()));
    }
    response
        .error_for_status()
        .map_err(DirectoryError::unavailable)?
        .json::<T>()
        .await
        .map_err(DirectoryError::unavailable)
}

/// Organization service client.
#[derive(Debug, Clone)]
pub struct HttpOrganizationDirectory {
    client: CollaboratorClient,
}

impl HttpOrganizationDirectory {
    /// Creates a directory backed by the organization service.
    #[must_use]
    pub const fn new(client: CollaboratorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrganizationDirectory for HttpOrganizationDirectory {
    async fn employee_position(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
    ) -> DirectoryResult<EmployeePosition> {
        let response = self
            .client
            .http()
            .post(self.client.url("employee/get-emp"))
            .json(&EmployeeLookup {
                user_id: account_id.value(),
                org_id: organization_id.value(),
            })
            .send()
            .await
            .map_err(DirectoryError::unavailable)?;
        let body: EmployeeBody = decode(response, || {
            format!("employee {account_id} of organization {organization_id}")
        })
        .await?;
        Ok(EmployeePosition::new(body.position))
    }

    async fn organization_name(&self, organization_id: OrganizationId) -> DirectoryResult<String> {
        let response = self
            .client
            .http()
            .get(self.client.url(&format!("org/{organization_id}")))
            .send()
            .await
            .map_err(DirectoryError::unavailable)?;
        let body: OrganizationBody =
            decode(response, || format!("organization {organization_id}")).await?;
        Ok(body.name)
    }
}

/// Auth service client resolving user display names.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: CollaboratorClient,
}

impl HttpUserDirectory {
    /// Creates a directory backed by the auth service.
    #[must_use]
    pub const fn new(client: CollaboratorClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn display_name(&self, account_id: AccountId) -> DirectoryResult<String> {
        let response = self
            .client
            .http()
            .get(self.client.url(&format!("user/{account_id}")))
            .send()
            .await
            .map_err(DirectoryError::unavailable)?;
        let body: UserBody = decode(response, || format!("user {account_id}")).await?;
        Ok(body.full_name)
    }
}
