//! Hidden Fork Core - Shared domain types.
//!
//! This crate provides the profile domain model used across all Hidden Fork
//! components:
//! - `client` - Backend clients and the profile/onboarding/media services
//! - `cli` - Command-line front end standing in for the mobile app
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. Profile records know how to convert themselves to and from the
//! backend's JSON document shape, but never talk to the backend themselves.
//!
//! # Modules
//!
//! - [`types`] - Account ids, emails, and status enums
//! - [`hours`] - The fixed seven-day opening-hours map
//! - [`tags`] - The two-tag selection policy
//! - [`event`] - Embedded restaurant events
//! - [`profile`] - Profile records, patches, and merge documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod event;
pub mod hours;
pub mod profile;
pub mod tags;
pub mod types;

pub use event::Event;
pub use hours::{CLOSED, WeekHours, Weekday};
pub use profile::{
    CustomerPatch, CustomerProfile, Document, RestaurantPatch, RestaurantProfile, ValidationError,
};
pub use tags::{MAX_TAGS, TagSet};
pub use types::*;
