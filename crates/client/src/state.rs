//! Application state shared across the domain services.
//!
//! One configured handle per hosted service, constructed explicitly by the
//! application root and injected everywhere it is needed. Nothing in this
//! crate creates a client at module scope.

use std::sync::Arc;

use crate::backend::{
    AuthBackend, BlobStore, DocumentStore, Geocoder, HttpAuthClient, HttpBlobStore,
    HttpDocumentStore, HttpGeocoder,
};
use crate::config::HiddenForkConfig;

/// Shared application state.
///
/// Cheaply cloneable via `Arc`; hands out the backend service handles and
/// the tuning knobs the domain services need.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    auth: Arc<dyn AuthBackend>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    geocoder: Arc<dyn Geocoder>,
    geocode_concurrency: usize,
}

impl AppState {
    /// Wire up HTTP clients for every hosted service from configuration.
    #[must_use]
    pub fn from_config(config: &HiddenForkConfig) -> Self {
        Self::with_backends(
            Arc::new(HttpAuthClient::new(&config.backend)),
            Arc::new(HttpDocumentStore::new(&config.backend)),
            Arc::new(HttpBlobStore::new(&config.backend)),
            Arc::new(HttpGeocoder::new(&config.geocoder)),
            config.geocoder.concurrency,
        )
    }

    /// Construct state over explicit backend handles.
    ///
    /// This is the seam the tests use to run the domain services against
    /// the in-memory backends.
    #[must_use]
    pub fn with_backends(
        auth: Arc<dyn AuthBackend>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        geocoder: Arc<dyn Geocoder>,
        geocode_concurrency: usize,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                auth,
                documents,
                blobs,
                geocoder,
                geocode_concurrency: geocode_concurrency.max(1),
            }),
        }
    }

    /// The auth service handle.
    #[must_use]
    pub fn auth(&self) -> &dyn AuthBackend {
        self.inner.auth.as_ref()
    }

    /// The document store handle.
    #[must_use]
    pub fn documents(&self) -> &dyn DocumentStore {
        self.inner.documents.as_ref()
    }

    /// The blob store handle.
    #[must_use]
    pub fn blobs(&self) -> &dyn BlobStore {
        self.inner.blobs.as_ref()
    }

    /// The geocoder handle.
    #[must_use]
    pub fn geocoder(&self) -> Arc<dyn Geocoder> {
        Arc::clone(&self.inner.geocoder)
    }

    /// Worker limit for bulk geocoding.
    #[must_use]
    pub fn geocode_concurrency(&self) -> usize {
        self.inner.geocode_concurrency
    }
}
