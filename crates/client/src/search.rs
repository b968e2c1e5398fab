//! Map search over the restaurant collection.
//!
//! Lists every restaurant record and resolves each address to map
//! coordinates through a bounded worker pool. Address resolution is
//! best-effort per entry: one bad or unresolvable address leaves that
//! entry without coordinates and never touches its neighbors.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use hidden_fork_core::{AccountId, RestaurantProfile};

use crate::backend::Coordinates;
use crate::error::Result;
use crate::state::AppState;

/// One restaurant as it appears on the map.
#[derive(Debug, Clone)]
pub struct RestaurantSummary {
    pub profile: RestaurantProfile,
    /// Resolved from the address at query time; `None` when the address is
    /// blank or could not be resolved.
    pub coordinates: Option<Coordinates>,
}

/// Restaurant discovery for the map screen.
#[derive(Clone)]
pub struct SearchService {
    state: AppState,
}

impl SearchService {
    /// Create the service over shared state.
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Every restaurant, with coordinates resolved where possible.
    ///
    /// Geocoding fans out under a semaphore sized by
    /// [`AppState::geocode_concurrency`], so a large collection never
    /// floods the geocoder. Entries whose record fails to parse are
    /// skipped with a warning rather than failing the whole search.
    ///
    /// # Errors
    ///
    /// [`crate::AppError::Store`] when the collection listing itself
    /// fails. Per-entry geocode failures never propagate.
    #[instrument(skip(self))]
    pub async fn map_restaurants(&self) -> Result<Vec<RestaurantSummary>> {
        let records = self.state.documents().list("restaurants").await?;
        debug!(count = records.len(), "listed restaurant records");

        let limit = self.state.geocode_concurrency();
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks = JoinSet::new();

        for (index, (id, doc)) in records.into_iter().enumerate() {
            let profile = match RestaurantProfile::from_document(AccountId::new(&id), doc) {
                Ok(profile) => profile,
                Err(err) => {
                    warn!(account_id = %id, error = %err, "skipping malformed record");
                    continue;
                }
            };
            if profile.address.trim().is_empty() {
                tasks.spawn(async move {
                    (index, RestaurantSummary {
                        profile,
                        coordinates: None,
                    })
                });
                continue;
            }
            let geocoder = self.state.geocoder();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The permit is held for the duration of the resolve.
                let permit = semaphore.acquire_owned().await;
                let coordinates = match permit {
                    Ok(_permit) => match geocoder.resolve(&profile.address).await {
                        Ok(found) => found,
                        Err(err) => {
                            warn!(
                                account_id = %profile.account_id,
                                error = %err,
                                "geocoding failed for one entry"
                            );
                            None
                        }
                    },
                    Err(_closed) => None,
                };
                (index, RestaurantSummary {
                    profile,
                    coordinates,
                })
            });
        }

        let mut indexed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => indexed.push(entry),
                Err(err) => warn!(error = %err, "geocode task panicked; entry dropped"),
            }
        }
        // Listing order is the presentation order.
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, summary)| summary).collect())
    }
}
