//! Integration tests for Hidden Fork.
//!
//! The tests under `tests/` run the domain services end to end over the
//! in-memory backends: full account journeys (sign up, onboard, edit,
//! search) rather than single-call checks. Shared fixtures live here.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use hidden_fork_client::AppState;
use hidden_fork_client::backend::memory::{
    FixedGeocoder, MemoryAuth, MemoryBlobStore, MemoryDocumentStore,
};

/// Every backend handle plus the state wired over them, so tests can both
/// drive the services and inspect the stores underneath.
pub struct TestBackends {
    pub auth: Arc<MemoryAuth>,
    pub documents: Arc<MemoryDocumentStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub geocoder: Arc<FixedGeocoder>,
    pub state: AppState,
}

impl TestBackends {
    /// Fresh in-memory backends with the default worker limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_geocode_concurrency(4)
    }

    /// Fresh in-memory backends with an explicit geocode worker limit.
    #[must_use]
    pub fn with_geocode_concurrency(limit: usize) -> Self {
        let auth = Arc::new(MemoryAuth::new());
        let documents = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let geocoder = Arc::new(FixedGeocoder::new());
        let state = AppState::with_backends(
            Arc::clone(&auth) as _,
            Arc::clone(&documents) as _,
            Arc::clone(&blobs) as _,
            Arc::clone(&geocoder) as _,
            limit,
        );
        Self {
            auth,
            documents,
            blobs,
            geocoder,
            state,
        }
    }
}

impl Default for TestBackends {
    fn default() -> Self {
        Self::new()
    }
}
