//! Clients for the hosted backend services.
//!
//! # Architecture
//!
//! Each hosted service sits behind a dyn trait so the domain services can
//! run against the real HTTP backend or the in-memory one:
//!
//! - [`AuthBackend`] - account credentials and sessions
//! - [`DocumentStore`] - JSON document collections with merge writes
//! - [`BlobStore`] - profile-image bytes and their download URLs
//! - [`Geocoder`] - free-text address to coordinates
//!
//! The HTTP implementations consume the backend's JSON REST surface
//! directly; no local state is kept beyond the geocoder's response cache.
//! The backend is the source of truth - there is NO local sync.

pub mod auth;
pub mod documents;
pub mod geocode;
pub mod memory;
pub mod storage;

pub use auth::{AuthBackend, AuthError, HttpAuthClient, Session};
pub use documents::{DocumentStore, HttpDocumentStore};
pub use geocode::{Coordinates, GeocodeError, Geocoder, HttpGeocoder};
pub use storage::{BlobStore, HttpBlobStore};

use thiserror::Error;

/// Errors from the document and blob store clients.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it was readable.
        message: String,
    },

    /// The addressed document or blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conditional create hit an existing document.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error means "the record is absent", the one outcome
    /// callers treat as a normal state rather than a failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
