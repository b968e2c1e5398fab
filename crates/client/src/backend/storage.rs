//! Blob storage client.
//!
//! Profile images are stored as blobs keyed by account id
//! (`profileImages/{accountId}`): one image per account, re-upload
//! overwrites in place, no versioning. The store hands out durable download
//! URLs which are what the profile documents actually reference.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use super::StoreError;
use crate::config::BackendConfig;

/// Access to the hosted blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload bytes to a path, overwriting any existing blob.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<(), StoreError>;

    /// A durable URL from which the blob can be fetched.
    async fn download_url(&self, path: &str) -> Result<String, StoreError>;

    /// Delete a blob. Used as the compensating action when a profile merge
    /// fails after an upload succeeded.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// HTTP client for the hosted blob store.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UrlResponse {
    url: String,
}

impl HttpBlobStore {
    /// Create a new blob store client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}/v1/{}/blobs",
                config.storage_base_url.trim_end_matches('/'),
                config.project_id
            ),
            api_key: config.api_key.expose_secret().to_string(),
        }
    }

    fn blob_url(&self, path: &str) -> String {
        // Blob paths contain slashes that are part of the key, so only the
        // individual segments are encoded.
        let encoded = path
            .split('/')
            .map(|seg| urlencoding::encode(seg).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{encoded}", self.base_url)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip(self, bytes), fields(path = %path, len = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.blob_url(path))
            .header("x-api-key", &self.api_key)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        check_status(response, path).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn download_url(&self, path: &str) -> Result<String, StoreError> {
        let url = format!("{}:url", self.blob_url(path));
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let response = check_status(response, path).await?;
        let parsed: UrlResponse = response.json().await?;
        Ok(parsed.url)
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.blob_url(path))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        // Deleting an already-absent blob is not a failure; the compensator
        // may race the backend's own cleanup.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(response, path).await?;
        Ok(())
    }
}

async fn check_status(
    response: reqwest::Response,
    path: &str,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(path.to_string()));
    }
    let message = response.text().await.unwrap_or_default();
    tracing::error!(
        status = %status,
        body = %message.chars().take(500).collect::<String>(),
        "blob store returned non-success status"
    );
    Err(StoreError::Api {
        status: status.as_u16(),
        message: message.chars().take(200).collect(),
    })
}

/// The blob path for an account's profile image.
#[must_use]
pub fn profile_image_path(account_id: &hidden_fork_core::AccountId) -> String {
    format!("profileImages/{account_id}")
}
