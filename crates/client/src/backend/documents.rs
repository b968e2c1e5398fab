//! Document store client.
//!
//! The hosted document store keeps each profile as a JSON document under
//! `{collection}/{id}`. Writes are merges: fields absent from the patch are
//! left untouched server-side. Creation is conditional so the exactly-once
//! onboarding transition can be enforced by the server, not by the UI.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use hidden_fork_core::Document;

use super::StoreError;
use crate::config::BackendConfig;

/// Access to JSON document collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document. Absence is a normal outcome, not an error.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merge a patch into a document, creating it if absent. Fields not in
    /// the patch are left untouched server-side.
    async fn merge(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError>;

    /// Create a document only if it does not exist yet.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the document is
    /// already present.
    async fn create(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError>;

    /// List every document in a collection with its id.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError>;

    /// Append a value to an array field, creating the field if absent.
    async fn array_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Remove every array element equal to the given value.
    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;
}

/// HTTP client for the hosted document store.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// One entry of a collection listing.
#[derive(Debug, Deserialize)]
struct ListedDocument {
    id: String,
    fields: Document,
}

/// Wrapper for the collection listing response.
#[derive(Debug, Deserialize)]
struct ListResponse {
    documents: Vec<ListedDocument>,
}

impl HttpDocumentStore {
    /// Create a new document store client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}/v1/{}/documents",
                config.api_base_url.trim_end_matches('/'),
                config.project_id
            ),
            api_key: config.api_key.expose_secret().to_string(),
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(collection),
            urlencoding::encode(id)
        )
    }

    async fn send_array_op(
        &self,
        collection: &str,
        id: &str,
        verb: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let url = format!("{}:{verb}", self.document_url(collection, id));
        let body = serde_json::json!({ "field": field, "value": value });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        check_status(response, &format!("{collection}/{id}")).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .client
            .get(self.document_url(collection, id))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("document absent");
            return Ok(None);
        }
        let response = check_status(response, &format!("{collection}/{id}")).await?;
        let doc: Document = response.json().await?;
        Ok(Some(doc))
    }

    #[instrument(skip(self, patch), fields(collection = %collection, id = %id))]
    async fn merge(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.document_url(collection, id))
            .header("x-api-key", &self.api_key)
            .json(&patch)
            .send()
            .await?;

        check_status(response, &format!("{collection}/{id}")).await?;
        Ok(())
    }

    #[instrument(skip(self, doc), fields(collection = %collection, id = %id))]
    async fn create(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.document_url(collection, id))
            .header("x-api-key", &self.api_key)
            // The guard lives server-side: the write is rejected when the
            // document already exists.
            .header("If-None-Match", "*")
            .json(&doc)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::PRECONDITION_FAILED
            || status == reqwest::StatusCode::CONFLICT
        {
            return Err(StoreError::AlreadyExists(format!("{collection}/{id}")));
        }
        check_status(response, &format!("{collection}/{id}")).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(collection));
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let response = check_status(response, collection).await?;
        let listing: ListResponse = response.json().await?;
        Ok(listing
            .documents
            .into_iter()
            .map(|d| (d.id, d.fields))
            .collect())
    }

    async fn array_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.send_array_op(collection, id, "appendToArray", field, value)
            .await
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.send_array_op(collection, id, "removeFromArray", field, value)
            .await
    }
}

/// Map a non-success response to a [`StoreError`], reading the body for
/// diagnostics.
async fn check_status(
    response: reqwest::Response,
    target: &str,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(target.to_string()));
    }
    let message = response.text().await.unwrap_or_default();
    tracing::error!(
        status = %status,
        body = %message.chars().take(500).collect::<String>(),
        "document store returned non-success status"
    );
    Err(StoreError::Api {
        status: status.as_u16(),
        message: message.chars().take(200).collect(),
    })
}
