//! Hidden Fork client library.
//!
//! The entire data layer of the app: typed backend clients for the hosted
//! services (auth, document store, blob storage, geocoding) and the domain
//! services built on top of them (profile load/merge, one-shot onboarding,
//! the profile-image upload pipeline, and map search).
//!
//! # Architecture
//!
//! - Every hosted service sits behind a dyn trait in [`backend`]; the HTTP
//!   implementations talk to the backend's JSON REST surface, and
//!   [`backend::memory`] provides in-process implementations for tests.
//! - Service handles are constructed explicitly and injected through
//!   [`state::AppState`]; nothing is created at module scope.
//! - All failures funnel into [`error::AppError`], which owns the stable
//!   user-facing message for each failure class.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod media;
pub mod onboarding;
pub mod profiles;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
pub use media::{ImageSource, MediaService, UploadOutcome};
pub use onboarding::OnboardingService;
pub use profiles::{PasswordChange, ProfileService, RestaurantView};
pub use search::{RestaurantSummary, SearchService};
pub use state::AppState;
