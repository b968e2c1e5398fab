//! Restaurant events embedded in the profile document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event or promotion announced by a restaurant.
///
/// Events are embedded values inside the restaurant document, not standalone
/// entities: they have no id and are appended and removed by whole-value
/// match. Two events are "the same" only when every field, including
/// `created_at`, is equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Display name of the event.
    pub event_name: String,
    /// Free-text description.
    pub description: String,
    /// Expected `YYYY-MM-DD`, but stored as given; the app never validates
    /// the format.
    pub date: String,
    /// Optional discount text (e.g. "10% off").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    /// When the event was created, set client-side at append time.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(
        event_name: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
        discount: Option<String>,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            description: description.into(),
            date: date.into(),
            discount,
            created_at: Utc::now(),
        }
    }
}
