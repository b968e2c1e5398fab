//! Geocoding client.
//!
//! Resolves the free-text `address` field to coordinates for map display.
//! Results are read-path enrichment only and are never persisted; a
//! short-lived in-memory cache keeps repeated profile views from hammering
//! the service without changing that contract.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GeocoderConfig;

/// Errors from the geocoding service.
///
/// Callers treat every variant as non-fatal: a profile without coordinates
/// still renders.
#[derive(Debug, Error)]
pub enum GeocodeError {
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
}

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Free-text address resolution.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve an address. `None` means the address could not be located,
    /// which is a normal outcome for free-text input.
    async fn resolve(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// HTTP client for the geocoding service, with a TTL cache on successful
/// resolutions.
#[derive(Clone)]
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, Coordinates>,
}

impl HttpGeocoder {
    /// Create a new geocoder client.
    #[must_use]
    pub fn new(config: &GeocoderConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    #[instrument(skip(self), fields(address = %address))]
    async fn resolve(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        if let Some(hit) = self.cache.get(address).await {
            debug!("cache hit for address");
            return Ok(Some(hit));
        }

        let url = format!(
            "{}/v1/geocode?address={}",
            self.base_url,
            urlencoding::encode(address)
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let coordinates: Coordinates = response.json().await?;
        self.cache
            .insert(address.to_string(), coordinates)
            .await;
        Ok(Some(coordinates))
    }
}
