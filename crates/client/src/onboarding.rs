//! Account-type assignment.
//!
//! Every account is exactly one of customer or restaurant, decided once at
//! onboarding. Which one an account is gets answered by probing both
//! collections; assignment is guarded server-side with a conditional
//! create, so two racing onboarding attempts cannot both win.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use hidden_fork_core::{AccountId, AccountKind, Document};

use crate::backend::{Session, StoreError};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Account-type lookup and assignment.
#[derive(Clone)]
pub struct OnboardingService {
    state: AppState,
}

impl OnboardingService {
    /// Create the service over shared state.
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Which kind of account this is, if it has been onboarded.
    ///
    /// Probes both collections. `None` means the account has signed up but
    /// not chosen a type yet; a record in both collections means the
    /// onboarding guard was bypassed somewhere and the account needs
    /// manual repair.
    ///
    /// # Errors
    ///
    /// [`AppError::AccountStateCorrupt`] on a record in both collections;
    /// [`AppError::Store`] on backend failure.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn account_kind(&self, account_id: &AccountId) -> Result<Option<AccountKind>> {
        let documents = self.state.documents();
        let customer = documents
            .get(AccountKind::Customer.collection(), account_id.as_str())
            .await?;
        let restaurant = documents
            .get(AccountKind::Restaurant.collection(), account_id.as_str())
            .await?;
        match (customer, restaurant) {
            (Some(_), Some(_)) => Err(AppError::AccountStateCorrupt(account_id.to_string())),
            (Some(_), None) => Ok(Some(AccountKind::Customer)),
            (None, Some(_)) => Ok(Some(AccountKind::Restaurant)),
            (None, None) => Ok(None),
        }
    }

    /// Assign the account its type, exactly once.
    ///
    /// Checks the opposite collection first so an account that already
    /// chose the other type gets a precise answer, then creates the
    /// initial record conditionally. The create only succeeds if no record
    /// exists yet, so of any number of concurrent assignment attempts at
    /// most one wins; the rest surface [`AppError::AlreadyAssigned`].
    ///
    /// # Errors
    ///
    /// [`AppError::AlreadyAssigned`] when a record already exists under
    /// either kind; [`AppError::Store`] on backend failure.
    #[instrument(skip(self, session), fields(account_id = %session.account_id, kind = %kind))]
    pub async fn assign(&self, session: &Session, kind: AccountKind) -> Result<()> {
        let documents = self.state.documents();
        let account_id = &session.account_id;

        if documents
            .get(kind.other().collection(), account_id.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyAssigned {
                existing: kind.other(),
            });
        }

        let result = documents
            .create(kind.collection(), account_id.as_str(), initial_record(session))
            .await;
        match result {
            Ok(()) => {
                info!("account onboarded");
                Ok(())
            }
            Err(StoreError::AlreadyExists(_)) => {
                Err(AppError::AlreadyAssigned { existing: kind })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// The record written at assignment time. Profile fields are filled in
/// later through the profile screens.
fn initial_record(session: &Session) -> Document {
    let mut doc = Map::new();
    doc.insert(
        "uid".to_string(),
        Value::String(session.account_id.to_string()),
    );
    doc.insert(
        "email".to_string(),
        Value::String(session.email.to_string()),
    );
    doc.insert(
        "createdAt".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    doc
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::memory::{
        FixedGeocoder, MemoryAuth, MemoryBlobStore, MemoryDocumentStore,
    };
    use hidden_fork_core::Email;

    async fn fixture() -> (OnboardingService, Session, Arc<MemoryDocumentStore>) {
        use crate::backend::AuthBackend;

        let auth = Arc::new(MemoryAuth::new());
        let email = Email::parse("new@fork.example").expect("email");
        let session = auth.sign_up(&email, "hunter22").await.expect("sign up");
        let documents = Arc::new(MemoryDocumentStore::new());
        let state = AppState::with_backends(
            auth,
            Arc::clone(&documents) as _,
            Arc::new(MemoryBlobStore::new()),
            Arc::new(FixedGeocoder::new()),
            4,
        );
        (OnboardingService::new(state), session, documents)
    }

    #[tokio::test]
    async fn test_fresh_account_has_no_kind() {
        let (service, session, _) = fixture().await;
        let kind = service
            .account_kind(&session.account_id)
            .await
            .expect("lookup");
        assert_eq!(kind, None);
    }

    #[tokio::test]
    async fn test_assignment_writes_initial_record() {
        use crate::backend::DocumentStore;

        let (service, session, documents) = fixture().await;
        service
            .assign(&session, AccountKind::Restaurant)
            .await
            .expect("assign");

        let kind = service
            .account_kind(&session.account_id)
            .await
            .expect("lookup");
        assert_eq!(kind, Some(AccountKind::Restaurant));

        let doc = documents
            .get("restaurants", session.account_id.as_str())
            .await
            .expect("store")
            .expect("record exists");
        assert_eq!(
            doc.get("uid").and_then(serde_json::Value::as_str),
            Some(session.account_id.as_str())
        );
        assert_eq!(
            doc.get("email").and_then(serde_json::Value::as_str),
            Some("new@fork.example")
        );
        assert!(doc.contains_key("createdAt"));
    }

    #[tokio::test]
    async fn test_second_assignment_same_kind_rejected() {
        let (service, session, _) = fixture().await;
        service
            .assign(&session, AccountKind::Customer)
            .await
            .expect("first assignment");
        let err = service
            .assign(&session, AccountKind::Customer)
            .await
            .expect_err("second assignment");
        assert!(matches!(
            err,
            AppError::AlreadyAssigned {
                existing: AccountKind::Customer
            }
        ));
    }

    #[tokio::test]
    async fn test_cross_kind_assignment_names_existing_kind() {
        let (service, session, _) = fixture().await;
        service
            .assign(&session, AccountKind::Restaurant)
            .await
            .expect("first assignment");
        let err = service
            .assign(&session, AccountKind::Customer)
            .await
            .expect_err("cross assignment");
        assert!(matches!(
            err,
            AppError::AlreadyAssigned {
                existing: AccountKind::Restaurant
            }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_assignments_yield_one_winner() {
        let (service, session, _) = fixture().await;
        let mut set = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let service = service.clone();
            let session = session.clone();
            set.spawn(async move { service.assign(&session, AccountKind::Customer).await });
        }
        let mut wins = 0;
        let mut already = 0;
        while let Some(joined) = set.join_next().await {
            match joined.expect("task") {
                Ok(()) => wins += 1,
                Err(AppError::AlreadyAssigned { .. }) => already += 1,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(already, 7);
    }

    #[tokio::test]
    async fn test_record_in_both_collections_is_corrupt() {
        let (service, session, documents) = fixture().await;
        let doc: Document = serde_json::from_str("{}").expect("doc");
        documents
            .seed("customers", session.account_id.as_str(), doc.clone())
            .await;
        documents
            .seed("restaurants", session.account_id.as_str(), doc)
            .await;
        let err = service
            .account_kind(&session.account_id)
            .await
            .expect_err("corrupt state");
        assert!(matches!(err, AppError::AccountStateCorrupt(_)));
    }
}
