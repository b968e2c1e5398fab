//! Profile synchronization: defaults on load, merge on save, the tag
//! limit, events, the settings password flow, and the image upload saga.

use std::sync::atomic::Ordering;

use async_trait::async_trait;
use hidden_fork_core::{
    AccountId, AccountKind, CustomerPatch, Document, Email, Event, RestaurantPatch,
    RestaurantStatus, TagSet, ValidationError, Weekday, CLOSED,
};
use hidden_fork_integration_tests::TestBackends;
use hidden_fork_client::backend::memory::{
    FixedGeocoder, MemoryAuth, MemoryBlobStore, MemoryDocumentStore,
};
use hidden_fork_client::backend::{AuthBackend, DocumentStore, Session, StoreError};
use hidden_fork_client::media::{NormalizedImage, PickedImage};
use hidden_fork_client::profiles::PasswordChange;
use hidden_fork_client::{
    AppError, AppState, ImageSource, MediaService, ProfileService, UploadOutcome,
};

fn doc(json: &str) -> Document {
    serde_json::from_str(json).expect("valid document")
}

async fn restaurant_session(backends: &TestBackends) -> Session {
    let email = Email::parse("owner@fork.example").expect("email");
    let session = backends
        .auth
        .sign_up(&email, "hunter22")
        .await
        .expect("sign up");
    backends
        .documents
        .seed("restaurants", session.account_id.as_str(), doc("{}"))
        .await;
    session
}

// =============================================================================
// Defaults and merge
// =============================================================================

#[tokio::test]
async fn test_sparse_record_loads_with_all_defaults() {
    let backends = TestBackends::new();
    backends
        .documents
        .seed(
            "restaurants",
            "r1",
            doc(r#"{"uid": "r1", "email": "o@x.y", "createdAt": "2026-01-01", "businessName": "Forkful"}"#),
        )
        .await;
    let profiles = ProfileService::new(backends.state.clone());

    let profile = profiles
        .load_restaurant(&AccountId::new("r1"))
        .await
        .expect("load");
    assert_eq!(profile.business_name, "Forkful");
    assert_eq!(profile.address, "");
    assert!(profile.restaurant_type.is_none());
    assert!(profile.status.is_none());
    assert!(profile.profile_image_url.is_none());
    assert!(profile.tags.is_empty());
    assert!(profile.events.is_empty());
    for day in Weekday::ALL {
        assert_eq!(profile.hours.get(day), CLOSED);
    }
}

#[tokio::test]
async fn test_save_touches_only_patched_fields() {
    let backends = TestBackends::new();
    backends
        .documents
        .seed(
            "restaurants",
            "r1",
            doc(r#"{"businessName": "Forkful", "address": "1 Main St", "tags": ["BBQ"]}"#),
        )
        .await;
    let profiles = ProfileService::new(backends.state.clone());
    let id = AccountId::new("r1");

    let patch = RestaurantPatch {
        status: Some(RestaurantStatus::Busy),
        ..RestaurantPatch::default()
    };
    profiles.save_restaurant(&id, patch).await.expect("save");

    let profile = profiles.load_restaurant(&id).await.expect("load");
    assert_eq!(profile.status, Some(RestaurantStatus::Busy));
    assert_eq!(profile.business_name, "Forkful");
    assert_eq!(profile.address, "1 Main St");
    assert!(profile.tags.contains("BBQ"));
}

#[tokio::test]
async fn test_hours_roundtrip_keeps_seven_days() {
    let backends = TestBackends::new();
    let session = restaurant_session(&backends).await;
    let profiles = ProfileService::new(backends.state.clone());

    let mut profile = profiles
        .load_restaurant(&session.account_id)
        .await
        .expect("load");
    profile.hours.set(Weekday::Fri, "5 PM - 11 PM");
    let patch = RestaurantPatch {
        hours: Some(profile.hours),
        ..RestaurantPatch::default()
    };
    profiles
        .save_restaurant(&session.account_id, patch)
        .await
        .expect("save");

    let reloaded = profiles
        .load_restaurant(&session.account_id)
        .await
        .expect("reload");
    assert_eq!(reloaded.hours.get(Weekday::Fri), "5 PM - 11 PM");
    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu] {
        assert_eq!(reloaded.hours.get(day), CLOSED);
    }
    assert!(reloaded.hours.is_open(Weekday::Fri));
}

#[tokio::test]
async fn test_third_tag_rejected_before_any_write() {
    let backends = TestBackends::new();
    let profiles = ProfileService::new(backends.state.clone());

    let mut tags = TagSet::new();
    tags.try_add("BBQ").expect("first");
    tags.try_add("Vegan").expect("second");
    let err = tags.try_add("Tacos").expect_err("third must fail");
    assert_eq!(err, ValidationError::TooManyTags { max: 2 });
    assert_eq!(tags.as_slice(), ["BBQ", "Vegan"]);

    // An over-limit set built some other way is still caught at save.
    let oversized: TagSet = ["a", "b", "c"].into_iter().map(String::from).collect();
    let patch = RestaurantPatch {
        tags: Some(oversized),
        ..RestaurantPatch::default()
    };
    let err = profiles
        .save_restaurant(&AccountId::new("r1"), patch)
        .await
        .expect_err("over limit");
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(backends.documents.merge_calls.load(Ordering::Relaxed), 0);
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_event_lifecycle() {
    let backends = TestBackends::new();
    let session = restaurant_session(&backends).await;
    let profiles = ProfileService::new(backends.state.clone());

    let taco = Event::new("Taco Night", "Half-price tacos", "2026-09-01", Some("50%".into()));
    let quiz = Event::new("Quiz Night", "Trivia", "2026-09-02", None);
    profiles
        .add_event(&session.account_id, taco.clone())
        .await
        .expect("add");
    profiles
        .add_event(&session.account_id, quiz.clone())
        .await
        .expect("add");

    let profile = profiles
        .load_restaurant(&session.account_id)
        .await
        .expect("load");
    assert_eq!(profile.events, vec![taco.clone(), quiz.clone()]);

    profiles
        .remove_event(&session.account_id, &taco)
        .await
        .expect("remove");
    let profile = profiles
        .load_restaurant(&session.account_id)
        .await
        .expect("reload");
    assert_eq!(profile.events, vec![quiz]);
}

// =============================================================================
// Settings with password change
// =============================================================================

#[tokio::test]
async fn test_settings_flow_merges_then_changes_password() {
    let backends = TestBackends::new();
    let session = restaurant_session(&backends).await;
    let profiles = ProfileService::new(backends.state.clone());
    let email = session.email.clone();

    let patch = RestaurantPatch {
        business_name: Some("Forkful & Sons".to_owned()),
        ..RestaurantPatch::default()
    };
    profiles
        .save_restaurant_settings(
            &session,
            patch,
            Some(PasswordChange {
                current: "hunter22".to_owned(),
                new: "swordfish".to_owned(),
            }),
        )
        .await
        .expect("settings save");

    // Old password is out, new one works, merge landed.
    backends
        .auth
        .sign_in(&email, "hunter22")
        .await
        .expect_err("old password rejected");
    backends
        .auth
        .sign_in(&email, "swordfish")
        .await
        .expect("new password accepted");
    let profile = profiles
        .load_restaurant(&session.account_id)
        .await
        .expect("load");
    assert_eq!(profile.business_name, "Forkful & Sons");
}

#[tokio::test]
async fn test_customer_settings_reject_wrong_current_password() {
    let backends = TestBackends::new();
    let email = Email::parse("c@fork.example").expect("email");
    let session = backends
        .auth
        .sign_up(&email, "hunter22")
        .await
        .expect("sign up");
    backends
        .documents
        .seed("customers", session.account_id.as_str(), doc("{}"))
        .await;
    let profiles = ProfileService::new(backends.state.clone());

    let patch = CustomerPatch {
        display_name: Some("Ada".to_owned()),
        ..CustomerPatch::default()
    };
    let err = profiles
        .save_customer_settings(
            &session,
            patch,
            Some(PasswordChange {
                current: "wrong".to_owned(),
                new: "swordfish".to_owned(),
            }),
        )
        .await
        .expect_err("reauth fails");
    assert!(matches!(err, AppError::Auth(_)));
    assert_eq!(backends.documents.merge_calls.load(Ordering::Relaxed), 0);
    backends
        .auth
        .sign_in(&email, "hunter22")
        .await
        .expect("password unchanged");
}

// =============================================================================
// Image upload saga
// =============================================================================

struct OnePixel;

#[async_trait]
impl ImageSource for OnePixel {
    async fn pick(&self) -> Result<Option<PickedImage>, AppError> {
        Ok(Some(PickedImage {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            content_type: "image/jpeg".to_string(),
        }))
    }

    async fn normalize(&self, image: PickedImage) -> Result<NormalizedImage, AppError> {
        Ok(NormalizedImage {
            bytes: image.bytes,
            content_type: image.content_type,
        })
    }
}

#[tokio::test]
async fn test_image_upload_reaches_profile() {
    let backends = TestBackends::new();
    let session = restaurant_session(&backends).await;
    let media = MediaService::new(backends.state.clone());

    let outcome = media
        .set_profile_image(AccountKind::Restaurant, &session.account_id, &OnePixel)
        .await
        .expect("upload");
    let UploadOutcome::Updated { url } = outcome else {
        panic!("expected an update");
    };

    let profile = ProfileService::new(backends.state.clone())
        .load_restaurant(&session.account_id)
        .await
        .expect("load");
    assert_eq!(profile.profile_image_url, Some(url));
    assert!(
        backends
            .blobs
            .contains(&format!("profileImages/{}", session.account_id))
            .await
    );
}

/// Document store that refuses merges, for driving the compensation path.
struct MergelessStore(MemoryDocumentStore);

#[async_trait]
impl DocumentStore for MergelessStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.0.get(collection, id).await
    }

    async fn merge(&self, _: &str, _: &str, _: Document) -> Result<(), StoreError> {
        Err(StoreError::Api {
            status: 503,
            message: "merge unavailable".to_string(),
        })
    }

    async fn create(&self, collection: &str, id: &str, fields: Document) -> Result<(), StoreError> {
        self.0.create(collection, id, fields).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        self.0.list(collection).await
    }

    async fn array_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.0.array_append(collection, id, field, value).await
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.0.array_remove(collection, id, field, value).await
    }
}

#[tokio::test]
async fn test_failed_merge_leaves_no_orphaned_blob() {
    use std::sync::Arc;

    let blobs = Arc::new(MemoryBlobStore::new());
    let state = AppState::with_backends(
        Arc::new(MemoryAuth::new()),
        Arc::new(MergelessStore(MemoryDocumentStore::new())),
        Arc::clone(&blobs) as _,
        Arc::new(FixedGeocoder::new()),
        4,
    );

    let err = MediaService::new(state)
        .set_profile_image(AccountKind::Customer, &AccountId::new("c1"), &OnePixel)
        .await
        .expect_err("merge failure propagates");
    assert!(matches!(err, AppError::Store(_)));
    assert!(!blobs.contains("profileImages/c1").await);
}
