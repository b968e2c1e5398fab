//! Account identifier issued by the hosted auth service.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Unique account identifier.
///
/// Issued by the auth service at sign-up and used as the document key in
/// both the `customers` and `restaurants` collections. The value is opaque;
/// the only local constraint is that it is never empty.
///
/// # Example
///
/// ```
/// use hidden_fork_core::AccountId;
///
/// let id = AccountId::new("u-1a2b3c");
/// assert_eq!(id.as_str(), "u-1a2b3c");
/// ```
/// The `Default` value is the empty id, used only as a deserialization
/// placeholder before the document key is attached; it never refers to a
/// real account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty.
    ///
    /// An empty id never refers to a real account; callers reject it before
    /// issuing any backend call.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_round_trip() {
        let id = AccountId::new("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id, AccountId::from("abc123"));
    }

    #[test]
    fn test_account_id_empty() {
        assert!(AccountId::new("").is_empty());
        assert!(!AccountId::new("x").is_empty());
    }

    #[test]
    fn test_account_id_serde_transparent() {
        let id = AccountId::new("u-42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"u-42\"");
    }
}
