//! File-storage service client.

use super::CollaboratorClient;
use crate::workflow::ports::{FileStorage, FileStorageError};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody {
    key_name: String,
}

/// Stores attachments through the file-storage service.
#[derive(Debug, Clone)]
pub struct HttpFileStorage {
    client: CollaboratorClient,
}

impl HttpFileStorage {
    /// Creates a storage backed by the file-storage service.
    #[must_use]
    pub const fn new(client: CollaboratorClient) -> Self {
        Self { client }
    }
}

async fn rejection(response: reqwest::Response) -> FileStorageError {
    let status = response.status();
    let detail = response.text().await.unwrap_or_default();
    FileStorageError::Rejected(format!("{status}: {detail}"))
}

#[async_trait]
impl FileStorage for HttpFileStorage {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, FileStorageError> {
        let response = self
            .client
            .http()
            .post(self.client.url("file/upload"))
            .query(&[("fileName", file_name)])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(FileStorageError::unavailable)?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        let body: UploadBody = response
            .json()
            .await
            .map_err(FileStorageError::unavailable)?;
        Ok(body.key_name)
    }

    async fn delete(&self, key: &str) -> Result<(), FileStorageError> {
        let response = self
            .client
            .http()
            .delete(self.client.url(&format!("file/{key}")))
            .send()
            .await
            .map_err(FileStorageError::unavailable)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }
}
