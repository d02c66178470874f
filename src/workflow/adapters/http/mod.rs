//! HTTP clients for the collaborator services.
//!
//! Each client wraps a shared [`reqwest::Client`] configured with a request
//! timeout and talks JSON to one base URL.

mod directory;
mod files;
mod notifier;

pub use directory::{HttpOrganizationDirectory, HttpUserDirectory};
pub use files::HttpFileStorage;
pub use notifier::HttpNotificationChannel;

use std::time::Duration;

/// Base URL plus the HTTP client used to reach one collaborator.
#[derive(Debug, Clone)]
pub struct CollaboratorClient {
    client: reqwest::Client,
    base_url: String,
}

impl CollaboratorClient {
    /// Builds a client for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] when the TLS backend cannot be initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing client so several collaborators can share a pool.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base: String = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            client,
            base_url: base,
        }
    }

    /// Returns the configured base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    const fn http(&self) -> &reqwest::Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::CollaboratorClient;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:8080", "employee/get-emp", "http://localhost:8080/employee/get-emp")]
    #[case("http://localhost:8080/", "/org/7", "http://localhost:8080/org/7")]
    #[case("http://files//", "file/abc.png", "http://files/file/abc.png")]
    fn joins_base_url_and_path(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let client = CollaboratorClient::with_client(reqwest::Client::new(), base);
        assert_eq!(client.url(path), expected);
    }
}
