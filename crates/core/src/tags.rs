//! Restaurant tag selection with the two-tag policy.

use serde::{Deserialize, Serialize};

use crate::profile::ValidationError;

/// Maximum number of tags a restaurant may select.
pub const MAX_TAGS: usize = 2;

/// An ordered, duplicate-free set of restaurant tags.
///
/// The two-tag limit is client-side policy, not enforced by the backend, so
/// deserialization accepts whatever the stored record contains; only local
/// additions are policed. A rejected insert leaves the set unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// An empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a tag, enforcing the [`MAX_TAGS`] policy.
    ///
    /// Adding a tag that is already present is a no-op and always succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TooManyTags`] when the set already holds
    /// the maximum number of tags.
    pub fn try_add(&mut self, tag: impl Into<String>) -> Result<(), ValidationError> {
        let tag = tag.into();
        if self.0.contains(&tag) {
            return Ok(());
        }
        if self.0.len() >= MAX_TAGS {
            return Err(ValidationError::TooManyTags { max: MAX_TAGS });
        }
        self.0.push(tag);
        Ok(())
    }

    /// Remove a tag if present; returns whether it was removed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Whether the set contains a tag.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Number of selected tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tags are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tags in selection order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl FromIterator<String> for TagSet {
    /// Collect tags without applying the limit; used when reading stored
    /// records, which the backend does not police.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut tags = Vec::new();
        for tag in iter {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Self(tags)
    }
}
