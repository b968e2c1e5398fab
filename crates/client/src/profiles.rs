//! Profile load/merge service.
//!
//! The synchronization contract with the document store: loads substitute a
//! documented default for every missing field and never return a partial
//! record; saves are merge patches carrying only what the user changed,
//! validated client-side before anything goes on the wire. The caller's
//! local state is the source of truth after a successful save - nothing is
//! read back.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use hidden_fork_core::{
    AccountId, AccountKind, CustomerPatch, CustomerProfile, Event, RestaurantPatch,
    RestaurantProfile, ValidationError,
};

use crate::backend::{Coordinates, Session, StoreError};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// A restaurant profile enriched with display coordinates.
///
/// Coordinates are derived from the address on every read and never
/// persisted; `None` means the address could not be resolved, which must
/// not keep the rest of the profile from rendering.
#[derive(Debug, Clone)]
pub struct RestaurantView {
    pub profile: RestaurantProfile,
    pub coordinates: Option<Coordinates>,
}

/// A password change requested alongside a settings save.
///
/// The current password re-authenticates the account before anything is
/// changed.
#[derive(Clone)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
}

/// Profile read/merge operations.
#[derive(Clone)]
pub struct ProfileService {
    state: AppState,
}

impl ProfileService {
    /// Create the service over shared state.
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    // =========================================================================
    // Loads
    // =========================================================================

    /// Load a customer profile with every missing field defaulted.
    ///
    /// # Errors
    ///
    /// [`AppError::ProfileNotFound`] when no record exists (the caller
    /// redirects to onboarding); [`AppError::Store`] on backend failure.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn load_customer(&self, account_id: &AccountId) -> Result<CustomerProfile> {
        let doc = self
            .fetch_document(AccountKind::Customer, account_id)
            .await?;
        let profile =
            CustomerProfile::from_document(account_id.clone(), doc).map_err(StoreError::Parse)?;
        Ok(profile)
    }

    /// Load a restaurant profile with every missing field defaulted.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::load_customer`].
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn load_restaurant(&self, account_id: &AccountId) -> Result<RestaurantProfile> {
        let doc = self
            .fetch_document(AccountKind::Restaurant, account_id)
            .await?;
        let profile =
            RestaurantProfile::from_document(account_id.clone(), doc).map_err(StoreError::Parse)?;
        Ok(profile)
    }

    /// Load a restaurant profile and resolve its map coordinates.
    ///
    /// Geocoding failure is non-fatal: the view comes back with
    /// `coordinates: None` and the profile intact.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::load_restaurant`]; geocoder errors never
    /// propagate from here.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn load_restaurant_view(&self, account_id: &AccountId) -> Result<RestaurantView> {
        let profile = self.load_restaurant(account_id).await?;
        let coordinates = match self.state.geocoder().resolve(&profile.address).await {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, "geocoding failed; rendering without coordinates");
                None
            }
        };
        Ok(RestaurantView {
            profile,
            coordinates,
        })
    }

    // =========================================================================
    // Saves
    // =========================================================================

    /// Merge a customer patch into the stored record.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] before any backend call;
    /// [`AppError::Store`] on backend failure (not retried).
    #[instrument(skip(self, patch), fields(account_id = %account_id))]
    pub async fn save_customer(&self, account_id: &AccountId, patch: CustomerPatch) -> Result<()> {
        require_account_id(account_id)?;
        patch.validate()?;
        if patch.is_empty() {
            debug!("empty patch; nothing to save");
            return Ok(());
        }
        self.state
            .documents()
            .merge(
                AccountKind::Customer.collection(),
                account_id.as_str(),
                patch.into_document(),
            )
            .await?;
        Ok(())
    }

    /// Merge a restaurant patch into the stored record.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::save_customer`].
    #[instrument(skip(self, patch), fields(account_id = %account_id))]
    pub async fn save_restaurant(
        &self,
        account_id: &AccountId,
        patch: RestaurantPatch,
    ) -> Result<()> {
        require_account_id(account_id)?;
        patch.validate()?;
        if patch.is_empty() {
            debug!("empty patch; nothing to save");
            return Ok(());
        }
        self.state
            .documents()
            .merge(
                AccountKind::Restaurant.collection(),
                account_id.as_str(),
                patch.into_document(),
            )
            .await?;
        Ok(())
    }

    /// Save settings with an optional password change.
    ///
    /// Order matches the settings screens: re-authenticate first when a
    /// password change is requested, then merge the profile patch, then
    /// change the password. A failed re-authentication stops everything; a
    /// failed password change after a successful merge leaves the merge in
    /// place.
    ///
    /// # Errors
    ///
    /// [`AppError::Auth`] when re-authentication or the password change is
    /// rejected, plus the [`Self::save_restaurant`] contract.
    #[instrument(skip(self, session, patch, password))]
    pub async fn save_restaurant_settings(
        &self,
        session: &Session,
        patch: RestaurantPatch,
        password: Option<PasswordChange>,
    ) -> Result<()> {
        if let Some(change) = &password {
            self.state
                .auth()
                .reauthenticate(&session.email, &change.current)
                .await?;
        }
        self.save_restaurant(&session.account_id, patch).await?;
        if let Some(change) = password {
            self.state
                .auth()
                .change_password(session, &change.new)
                .await?;
        }
        Ok(())
    }

    /// Customer counterpart of [`Self::save_restaurant_settings`].
    ///
    /// # Errors
    ///
    /// Same contract.
    #[instrument(skip(self, session, patch, password))]
    pub async fn save_customer_settings(
        &self,
        session: &Session,
        patch: CustomerPatch,
        password: Option<PasswordChange>,
    ) -> Result<()> {
        if let Some(change) = &password {
            self.state
                .auth()
                .reauthenticate(&session.email, &change.current)
                .await?;
        }
        self.save_customer(&session.account_id, patch).await?;
        if let Some(change) = password {
            self.state
                .auth()
                .change_password(session, &change.new)
                .await?;
        }
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Append an event to a restaurant's event list.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] for a blank event name;
    /// [`AppError::Store`] on backend failure.
    #[instrument(skip(self, event), fields(account_id = %account_id, event = %event.event_name))]
    pub async fn add_event(&self, account_id: &AccountId, event: Event) -> Result<()> {
        require_account_id(account_id)?;
        if event.event_name.trim().is_empty() {
            return Err(ValidationError::EmptyEventName.into());
        }
        let value = event_value(&event)?;
        self.state
            .documents()
            .array_append(
                AccountKind::Restaurant.collection(),
                account_id.as_str(),
                "events",
                value,
            )
            .await?;
        Ok(())
    }

    /// Remove an event by whole-value match.
    ///
    /// Removing an event that is no longer present succeeds silently;
    /// another device may have removed it first.
    ///
    /// # Errors
    ///
    /// [`AppError::Store`] on backend failure.
    #[instrument(skip(self, event), fields(account_id = %account_id, event = %event.event_name))]
    pub async fn remove_event(&self, account_id: &AccountId, event: &Event) -> Result<()> {
        require_account_id(account_id)?;
        let value = event_value(event)?;
        self.state
            .documents()
            .array_remove(
                AccountKind::Restaurant.collection(),
                account_id.as_str(),
                "events",
                value,
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn fetch_document(
        &self,
        kind: AccountKind,
        account_id: &AccountId,
    ) -> Result<hidden_fork_core::Document> {
        require_account_id(account_id)?;
        self.state
            .documents()
            .get(kind.collection(), account_id.as_str())
            .await?
            .ok_or_else(|| AppError::ProfileNotFound {
                kind,
                account_id: account_id.to_string(),
            })
    }
}

fn require_account_id(account_id: &AccountId) -> Result<()> {
    if account_id.is_empty() {
        return Err(ValidationError::EmptyAccountId.into());
    }
    Ok(())
}

fn event_value(event: &Event) -> Result<Value> {
    // Events are plain data; serialization only fails on a malformed
    // timestamp, which chrono cannot produce.
    serde_json::to_value(event).map_err(|e| AppError::Store(StoreError::Parse(e)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::memory::{
        FixedGeocoder, MemoryAuth, MemoryBlobStore, MemoryDocumentStore,
    };
    use hidden_fork_core::{CLOSED, Weekday};

    fn state_with(documents: Arc<MemoryDocumentStore>, geocoder: Arc<FixedGeocoder>) -> AppState {
        AppState::with_backends(
            Arc::new(MemoryAuth::new()),
            documents,
            Arc::new(MemoryBlobStore::new()),
            geocoder,
            4,
        )
    }

    fn doc(json: &str) -> hidden_fork_core::Document {
        serde_json::from_str(json).expect("valid document")
    }

    #[tokio::test]
    async fn test_load_missing_profile_signals_not_found() {
        let service = ProfileService::new(state_with(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(FixedGeocoder::new()),
        ));
        let err = service
            .load_customer(&AccountId::new("ghost"))
            .await
            .expect_err("missing record");
        assert!(err.is_profile_not_found());
    }

    #[tokio::test]
    async fn test_load_defaults_every_missing_field() {
        let documents = Arc::new(MemoryDocumentStore::new());
        documents
            .seed("restaurants", "r1", doc(r#"{"uid": "r1", "email": "r@x.y"}"#))
            .await;
        let service = ProfileService::new(state_with(documents, Arc::new(FixedGeocoder::new())));

        let profile = service
            .load_restaurant(&AccountId::new("r1"))
            .await
            .expect("load");
        assert_eq!(profile.business_name, "");
        assert!(profile.restaurant_type.is_none());
        assert!(profile.tags.is_empty());
        assert!(profile.events.is_empty());
        assert_eq!(profile.hours.get(Weekday::Wed), CLOSED);
    }

    #[tokio::test]
    async fn test_save_then_load_is_merge_not_replace() {
        let documents = Arc::new(MemoryDocumentStore::new());
        documents
            .seed(
                "restaurants",
                "r1",
                doc(r#"{"businessName": "Forkful", "address": "1 Main St"}"#),
            )
            .await;
        let service =
            ProfileService::new(state_with(Arc::clone(&documents), Arc::new(FixedGeocoder::new())));

        let patch = RestaurantPatch {
            address: Some("2 Oak Ave".to_owned()),
            ..RestaurantPatch::default()
        };
        service
            .save_restaurant(&AccountId::new("r1"), patch)
            .await
            .expect("save");

        let profile = service
            .load_restaurant(&AccountId::new("r1"))
            .await
            .expect("load");
        assert_eq!(profile.address, "2 Oak Ave");
        assert_eq!(profile.business_name, "Forkful");
    }

    #[tokio::test]
    async fn test_invalid_patch_never_reaches_backend() {
        let documents = Arc::new(MemoryDocumentStore::new());
        let service =
            ProfileService::new(state_with(Arc::clone(&documents), Arc::new(FixedGeocoder::new())));

        let patch = RestaurantPatch {
            business_name: Some("  ".to_owned()),
            ..RestaurantPatch::default()
        };
        let err = service
            .save_restaurant(&AccountId::new("r1"), patch)
            .await
            .expect_err("validation");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            documents.merge_calls.load(std::sync::atomic::Ordering::Relaxed),
            0
        );
    }

    #[tokio::test]
    async fn test_geocode_failure_does_not_block_profile_view() {
        let documents = Arc::new(MemoryDocumentStore::new());
        documents
            .seed(
                "restaurants",
                "r1",
                doc(r#"{"businessName": "Forkful", "address": "nowhere"}"#),
            )
            .await;
        let geocoder = Arc::new(FixedGeocoder::new());
        geocoder.fail_for("nowhere").await;
        let service = ProfileService::new(state_with(documents, geocoder));

        let view = service
            .load_restaurant_view(&AccountId::new("r1"))
            .await
            .expect("view loads despite geocode failure");
        assert!(view.coordinates.is_none());
        assert_eq!(view.profile.business_name, "Forkful");
    }

    #[tokio::test]
    async fn test_event_append_and_value_remove() {
        let documents = Arc::new(MemoryDocumentStore::new());
        documents.seed("restaurants", "r1", doc("{}")).await;
        let service =
            ProfileService::new(state_with(Arc::clone(&documents), Arc::new(FixedGeocoder::new())));
        let id = AccountId::new("r1");

        let keep = Event::new("Taco Night", "Half-price", "2026-09-01", None);
        let drop = Event::new("Quiz Night", "Trivia", "2026-09-02", None);
        service.add_event(&id, keep.clone()).await.expect("add");
        service.add_event(&id, drop.clone()).await.expect("add");
        service.remove_event(&id, &drop).await.expect("remove");

        let profile = service.load_restaurant(&id).await.expect("load");
        assert_eq!(profile.events, vec![keep]);
    }

    #[tokio::test]
    async fn test_blank_event_name_rejected() {
        let service = ProfileService::new(state_with(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(FixedGeocoder::new()),
        ));
        let event = Event::new("  ", "desc", "2026-09-01", None);
        let err = service
            .add_event(&AccountId::new("r1"), event)
            .await
            .expect_err("blank name");
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::EmptyEventName)
        ));
    }

    #[tokio::test]
    async fn test_settings_save_reauthenticates_before_anything() {
        use crate::backend::AuthBackend;

        let auth = Arc::new(MemoryAuth::new());
        let email = hidden_fork_core::Email::parse("r@x.y").expect("email");
        let session = auth.sign_up(&email, "hunter22").await.expect("sign up");

        let documents = Arc::new(MemoryDocumentStore::new());
        documents
            .seed(
                "restaurants",
                session.account_id.as_str(),
                doc(r#"{"businessName": "Forkful"}"#),
            )
            .await;
        let state = AppState::with_backends(
            Arc::clone(&auth) as _,
            Arc::clone(&documents) as _,
            Arc::new(MemoryBlobStore::new()),
            Arc::new(FixedGeocoder::new()),
            4,
        );
        let service = ProfileService::new(state);

        // Wrong current password: nothing is merged, nothing is changed.
        let patch = RestaurantPatch {
            address: Some("9 New Rd".to_owned()),
            ..RestaurantPatch::default()
        };
        let err = service
            .save_restaurant_settings(
                &session,
                patch.clone(),
                Some(PasswordChange {
                    current: "wrong".to_owned(),
                    new: "nextpass".to_owned(),
                }),
            )
            .await
            .expect_err("reauth must fail");
        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(
            documents.merge_calls.load(std::sync::atomic::Ordering::Relaxed),
            0
        );

        // Correct current password: merge lands and the new password works.
        service
            .save_restaurant_settings(
                &session,
                patch,
                Some(PasswordChange {
                    current: "hunter22".to_owned(),
                    new: "nextpass".to_owned(),
                }),
            )
            .await
            .expect("settings save");
        auth.sign_in(&email, "nextpass").await.expect("new password");
        let profile = service
            .load_restaurant(&session.account_id)
            .await
            .expect("load");
        assert_eq!(profile.address, "9 New Rd");
    }
}
