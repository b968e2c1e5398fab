//! Profile records, merge patches, and the backend document shape.
//!
//! A profile document lives under `customers/{accountId}` or
//! `restaurants/{accountId}` in the hosted document store. Reads tolerate
//! any subset of fields: every missing optional field is substituted with
//! its documented default, so a load never surfaces a partial record.
//! Writes are merge patches that carry only the fields the user changed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::Event;
use crate::hours::WeekHours;
use crate::tags::{MAX_TAGS, TagSet};
use crate::types::{AccountId, RestaurantStatus, RestaurantType};

/// The JSON object shape exchanged with the document store.
pub type Document = serde_json::Map<String, Value>;

/// Client-side validation failures, checked before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Operations require a real account id.
    #[error("account id cannot be empty")]
    EmptyAccountId,
    /// A customer's display name may not be blank once set.
    #[error("name cannot be empty")]
    EmptyDisplayName,
    /// A restaurant's business name may not be blank once set.
    #[error("business name cannot be empty")]
    EmptyBusinessName,
    /// An event must have a name.
    #[error("event name cannot be empty")]
    EmptyEventName,
    /// The tag selection limit was exceeded.
    #[error("at most {max} tags may be selected")]
    TooManyTags {
        /// Maximum number of tags.
        max: usize,
    },
}

// =============================================================================
// Customer
// =============================================================================

/// A customer account's profile, fully defaulted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    /// Owning account; not part of the stored field set (the document key
    /// carries it).
    #[serde(skip)]
    pub account_id: AccountId,
    /// Display name; empty until the user sets one.
    #[serde(default)]
    pub display_name: String,
    /// Free-text contact info.
    #[serde(default)]
    pub contact_info: String,
    /// Free-text bio.
    #[serde(default)]
    pub bio: String,
    /// Durable URL of the profile image, set only by the upload flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl CustomerProfile {
    /// A freshly onboarded customer with every field at its default.
    #[must_use]
    pub fn empty(account_id: AccountId) -> Self {
        Self {
            account_id,
            display_name: String::new(),
            contact_info: String::new(),
            bio: String::new(),
            profile_image_url: None,
        }
    }

    /// Build a profile from a stored document, defaulting missing fields.
    ///
    /// Fields this client does not model (`uid`, `email`, `createdAt`, ...)
    /// are ignored, not rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if a present field has the wrong
    /// type; absence is never an error.
    pub fn from_document(account_id: AccountId, doc: Document) -> Result<Self, serde_json::Error> {
        let mut profile: Self = serde_json::from_value(Value::Object(doc))?;
        profile.account_id = account_id;
        Ok(profile)
    }
}

/// Partial customer update; only set fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl CustomerPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.contact_info.is_none()
            && self.bio.is_none()
            && self.profile_image_url.is_none()
    }

    /// Client-side pre-flight validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDisplayName`] when the patch would
    /// blank the display name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.display_name
            && name.trim().is_empty()
        {
            return Err(ValidationError::EmptyDisplayName);
        }
        Ok(())
    }

    /// The merge document carrying only the set fields.
    #[must_use]
    pub fn into_document(self) -> Document {
        to_document(&self)
    }
}

// =============================================================================
// Restaurant
// =============================================================================

/// A restaurant account's profile, fully defaulted on read.
///
/// `coordinates` are intentionally absent here: they are derived from
/// `address` via geocoding on the read path and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantProfile {
    /// Owning account; carried by the document key, not a stored field.
    #[serde(skip)]
    pub account_id: AccountId,
    /// Business name; empty until the owner sets one.
    #[serde(default)]
    pub business_name: String,
    /// Restaurant vs food truck; unset until chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_type: Option<RestaurantType>,
    /// Selected tags; the two-tag limit applies to local edits only.
    #[serde(default)]
    pub tags: TagSet,
    /// Free-text street address.
    #[serde(default)]
    pub address: String,
    /// Weekly opening hours; missing days read as CLOSED.
    #[serde(default)]
    pub hours: WeekHours,
    /// Self-reported busyness; unset until the owner reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RestaurantStatus>,
    /// Durable URL of the profile image, set only by the upload flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// Announced events, in append order.
    #[serde(default)]
    pub events: Vec<Event>,
}

impl RestaurantProfile {
    /// A freshly onboarded restaurant with every field at its default.
    #[must_use]
    pub fn empty(account_id: AccountId) -> Self {
        Self {
            account_id,
            business_name: String::new(),
            restaurant_type: None,
            tags: TagSet::new(),
            address: String::new(),
            hours: WeekHours::closed(),
            status: None,
            profile_image_url: None,
            events: Vec::new(),
        }
    }

    /// Build a profile from a stored document, defaulting missing fields.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if a present field has the wrong
    /// type; absence is never an error.
    pub fn from_document(account_id: AccountId, doc: Document) -> Result<Self, serde_json::Error> {
        let mut profile: Self = serde_json::from_value(Value::Object(doc))?;
        profile.account_id = account_id;
        Ok(profile)
    }
}

/// Partial restaurant update; only set fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_type: Option<RestaurantType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<WeekHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RestaurantStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl RestaurantPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.business_name.is_none()
            && self.restaurant_type.is_none()
            && self.tags.is_none()
            && self.address.is_none()
            && self.hours.is_none()
            && self.status.is_none()
            && self.profile_image_url.is_none()
    }

    /// Client-side pre-flight validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyBusinessName`] when the patch would
    /// blank the business name, or [`ValidationError::TooManyTags`] when the
    /// patched tag set exceeds the limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.business_name
            && name.trim().is_empty()
        {
            return Err(ValidationError::EmptyBusinessName);
        }
        if let Some(tags) = &self.tags
            && tags.len() > MAX_TAGS
        {
            return Err(ValidationError::TooManyTags { max: MAX_TAGS });
        }
        Ok(())
    }

    /// The merge document carrying only the set fields.
    #[must_use]
    pub fn into_document(self) -> Document {
        to_document(&self)
    }
}

/// Serialize a patch struct into its merge document.
///
/// Patch types are plain data with string keys; their serialization cannot
/// fail, so a non-object result collapses to an empty patch.
fn to_document<T: Serialize>(patch: &T) -> Document {
    match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => Document::new(),
    }
}
