//! The identifier of the user that owns transactions and goals.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A newtype wrapper for user IDs issued by the identity provider.
///
/// The identity provider assigns opaque string IDs (the `sub` claim of the
/// bearer token), so no structure is assumed beyond being non-empty.
/// Wrapping it keeps user IDs from being mixed up with titles, categories and
/// other free text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
