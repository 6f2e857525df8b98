//! Stamp identifier type

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Compact, near-chronologically sortable identifier of an event or object.
///
/// Stamps are produced by [`crate::utils::stamp::generate`]. Ordering is the
/// plain lexicographic order of the underlying string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stamp(String);

impl Stamp {
    /// Wrap an existing stamp string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Stamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Stamp {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for Stamp {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Stamp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
