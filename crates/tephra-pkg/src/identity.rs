//! Package identity: the stable key the resolver deduplicates dependencies by.

use serde::{Deserialize, Serialize};

/// The identity of a package.
///
/// Two dependency specifications with equal identity but different
/// requirements describe the *same* package under different constraints,
/// not different packages. The value is opaque: it arrives already
/// normalized from manifest parsing and is compared exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageIdentity(String);

impl PackageIdentity {
    /// Create an identity from a pre-normalized string.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PackageIdentity {
    fn from(identity: &str) -> Self {
        Self::new(identity)
    }
}

impl From<String> for PackageIdentity {
    fn from(identity: String) -> Self {
        Self(identity)
    }
}
