//! In-memory backend implementations.
//!
//! These mirror the documented semantics of the hosted services - merge
//! writes are top-level field-by-field with last writer wins, creation is
//! conditional, blob re-upload overwrites - and back the test suites of
//! every crate in the workspace. No network, no persistence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use hidden_fork_core::{AccountId, Document, Email};

use super::auth::{AuthBackend, AuthError, Session};
use super::documents::DocumentStore;
use super::geocode::{Coordinates, GeocodeError, Geocoder};
use super::storage::BlobStore;
use super::StoreError;

// =============================================================================
// Auth
// =============================================================================

/// In-memory auth service keyed by email.
#[derive(Default)]
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, MemoryAccount>>,
}

struct MemoryAccount {
    account_id: AccountId,
    password: String,
}

impl MemoryAuth {
    /// Create an empty auth service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn session_for(account: &MemoryAccount, email: &Email) -> Session {
        Session {
            account_id: account.account_id.clone(),
            email: email.clone(),
            id_token: format!("token-{}", account.account_id),
        }
    }
}

#[async_trait]
impl AuthBackend for MemoryAuth {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        if password.len() < 6 {
            return Err(AuthError::WeakPassword(
                "must be at least 6 characters".to_string(),
            ));
        }
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email.as_str()) {
            return Err(AuthError::EmailInUse);
        }
        let account = MemoryAccount {
            account_id: AccountId::new(Uuid::new_v4().to_string()),
            password: password.to_string(),
        };
        let session = Self::session_for(&account, email);
        accounts.insert(email.as_str().to_string(), account);
        Ok(session)
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        let accounts = self.accounts.lock().await;
        let account = accounts
            .get(email.as_str())
            .ok_or(AuthError::InvalidCredentials)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Self::session_for(account, email))
    }

    async fn reauthenticate(
        &self,
        email: &Email,
        current_password: &str,
    ) -> Result<(), AuthError> {
        self.sign_in(email, current_password).await.map(|_| ())
    }

    async fn change_password(
        &self,
        session: &Session,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < 6 {
            return Err(AuthError::WeakPassword(
                "must be at least 6 characters".to_string(),
            ));
        }
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .values_mut()
            .find(|a| a.account_id == session.account_id)
            .ok_or(AuthError::InvalidCredentials)?;
        account.password = new_password.to_string();
        Ok(())
    }
}

// =============================================================================
// Documents
// =============================================================================

/// In-memory document store with the backend's merge semantics.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, HashMap<String, Document>>>,
    /// Number of merge calls observed, for saga tests.
    pub merge_calls: AtomicU64,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing the conditional-create guard.
    pub async fn seed(&self, collection: &str, id: &str, doc: Document) {
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn merge(&self, collection: &str, id: &str, patch: Document) -> Result<(), StoreError> {
        self.merge_calls.fetch_add(1, Ordering::Relaxed);
        let mut collections = self.collections.lock().await;
        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        // Top-level field-by-field, last writer wins.
        for (key, value) in patch {
            doc.insert(key, value);
        }
        Ok(())
    }

    async fn create(&self, collection: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::AlreadyExists(format!("{collection}/{id}")));
        }
        docs.insert(id.to_string(), doc);
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let collections = self.collections.lock().await;
        let mut docs: Vec<(String, Document)> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        docs.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(docs)
    }

    async fn array_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;
        match doc
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(StoreError::Api {
                status: 400,
                message: format!("field {field} is not an array"),
            }),
        }
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;
        if let Some(Value::Array(items)) = doc.get_mut(field) {
            items.retain(|item| item != &value);
        }
        Ok(())
    }
}

// =============================================================================
// Blobs
// =============================================================================

/// In-memory blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob exists at a path.
    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.lock().await.contains_key(path)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        self.blobs.lock().await.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, StoreError> {
        let blobs = self.blobs.lock().await;
        if !blobs.contains_key(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(format!("memory://blobs/{path}"))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.blobs.lock().await.remove(path);
        Ok(())
    }
}

// =============================================================================
// Geocoder
// =============================================================================

/// Geocoder answering from a fixed address table.
#[derive(Default)]
pub struct FixedGeocoder {
    table: Mutex<HashMap<String, Coordinates>>,
    /// Addresses that fail with a service error instead of "not found".
    failing: Mutex<Vec<String>>,
    /// Number of resolve calls observed, for concurrency tests.
    pub resolve_calls: AtomicU64,
}

impl FixedGeocoder {
    /// Create an empty geocoder; every address resolves to `None`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known address.
    pub async fn put(&self, address: &str, coordinates: Coordinates) {
        self.table
            .lock()
            .await
            .insert(address.to_string(), coordinates);
    }

    /// Make an address fail with a service error.
    pub async fn fail_for(&self, address: &str) {
        self.failing.lock().await.push(address.to_string());
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.resolve_calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.lock().await.iter().any(|a| a == address) {
            return Err(GeocodeError::Api {
                status: 503,
                message: "geocoder unavailable".to_string(),
            });
        }
        Ok(self.table.lock().await.get(address).copied())
    }
}
