//! Core types for Hidden Fork.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use id::AccountId;
pub use status::{AccountKind, RestaurantStatus, RestaurantType};
