//! Port for the binary file-storage service.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Stores and removes binary attachments by key.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Uploads `bytes` and returns the key the service assigned.
    ///
    /// # Errors
    ///
    /// Returns [`FileStorageError`] when the upload fails.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, FileStorageError>;

    /// Deletes the object stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FileStorageError`] when the deletion fails.
    async fn delete(&self, key: &str) -> Result<(), FileStorageError>;
}

/// Errors returned by file-storage adapters.
#[derive(Debug, Clone, Error)]
pub enum FileStorageError {
    /// The service answered with a rejection.
    #[error("file storage rejected the request: {0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("file storage unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl FileStorageError {
    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
