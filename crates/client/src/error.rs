//! Unified error handling.
//!
//! Every domain service returns `Result<T, AppError>`. The taxonomy follows
//! the app's four failure classes: validation (caught client-side, never
//! sent), profile-not-found (a normal state during onboarding), backend
//! unavailable (every transport/service failure behind one user-facing
//! message), and auth failures. `user_message` owns the stable string the
//! front end shows; the full cause goes to tracing, never to the user.

use thiserror::Error;

use hidden_fork_core::{AccountKind, ValidationError};

use crate::backend::{AuthError, GeocodeError, StoreError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client-side validation failed; nothing was sent to the backend.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No profile record exists for the account under the given kind.
    #[error("no {kind} profile for account {account_id}")]
    ProfileNotFound {
        /// The kind that was looked up.
        kind: AccountKind,
        /// The account that has no record.
        account_id: String,
    },

    /// Account-type assignment was attempted on an already-assigned
    /// account.
    #[error("account already assigned as {existing}")]
    AlreadyAssigned {
        /// The kind the account already has.
        existing: AccountKind,
    },

    /// The account has records under both collections, which the
    /// onboarding guard is supposed to make impossible.
    #[error("account {0} has both a customer and a restaurant record")]
    AccountStateCorrupt(String),

    /// Auth service rejected the operation.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Document or blob store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Geocoding failed. Only surfaced from the explicit resolve call;
    /// profile loads swallow this and render without coordinates.
    #[error("geocode error: {0}")]
    Geocode(#[from] GeocodeError),
}

impl AppError {
    /// The stable, actionable message shown to the user.
    ///
    /// Internal details (status codes, bodies, addresses) stay in the
    /// error's `Display`/tracing output and are never shown.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::ProfileNotFound { .. } => "Profile not found.".to_string(),
            Self::AlreadyAssigned { existing } => {
                format!("This account is already set up as a {existing}.")
            }
            Self::AccountStateCorrupt(_) => {
                "This account needs attention. Please contact support.".to_string()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password.".to_string(),
                AuthError::EmailInUse => {
                    "An account with this email already exists.".to_string()
                }
                AuthError::WeakPassword(detail) => format!("Password rejected: {detail}"),
                AuthError::Http(_) | AuthError::Api { .. } => {
                    "Something went wrong. Please try again.".to_string()
                }
            },
            Self::Store(_) | Self::Geocode(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }

    /// Whether the caller should offer the onboarding flow instead of a
    /// retry affordance.
    #[must_use]
    pub const fn is_profile_not_found(&self) -> bool {
        matches!(self, Self::ProfileNotFound { .. })
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
