//! Source-control locations and default package-name derivation.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::SerializeMap;
use std::path::{Path, PathBuf};

/// A source-control URL, kept as the exact string the manifest declared.
///
/// Git accepts locations that are not RFC URLs (scp-style
/// `git@host:org/repo.git` among them), so this is a plain string wrapper
/// rather than a parsed URL type. The wire encoding round-trips the string
/// byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceControlUrl(String);

impl SourceControlUrl {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path component of the URL with any trailing `.git` stripped.
    ///
    /// Used as the package name when a dependency declares none. Handles
    /// scp-style locations, where the component follows the final `:` when
    /// no `/` is present.
    #[must_use]
    pub fn default_package_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        let tail = match trimmed.rsplit_once('/') {
            Some((_, tail)) => tail,
            None => match trimmed.rsplit_once(':') {
                Some((_, tail)) => tail,
                None => trimmed,
            },
        };
        tail.strip_suffix(".git").unwrap_or(tail)
    }
}

impl std::fmt::Display for SourceControlUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceControlUrl {
    fn from(url: &str) -> Self {
        Self(url.to_owned())
    }
}

impl From<String> for SourceControlUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Where a source-control dependency lives: a repository on the local
/// filesystem or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceControlLocation {
    Local(PathBuf),
    Remote(SourceControlUrl),
}

impl SourceControlLocation {
    /// The package name implied by the location when none is declared.
    #[must_use]
    pub fn default_package_name(&self) -> String {
        match self {
            Self::Local(path) => default_name_for_path(path),
            Self::Remote(url) => url.default_package_name().to_owned(),
        }
    }
}

impl std::fmt::Display for SourceControlLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// The final path component, or the whole path rendered lossily when it has
/// none (the filesystem root among others).
pub(crate) fn default_name_for_path(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

impl Serialize for SourceControlLocation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Local(path) => map.serialize_entry("local", path)?,
            Self::Remote(url) => map.serialize_entry("remote", url)?,
        }
        map.end()
    }
}

// Decoding tries the known keys in a fixed priority order and ignores
// anything else, so containers written by newer tools still decode.
#[derive(Deserialize)]
struct LocationRepr {
    local: Option<PathBuf>,
    remote: Option<SourceControlUrl>,
}

impl<'de> Deserialize<'de> for SourceControlLocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = LocationRepr::deserialize(deserializer)?;
        if let Some(path) = repr.local {
            Ok(Self::Local(path))
        } else if let Some(url) = repr.remote {
            Ok(Self::Remote(url))
        } else {
            Err(de::Error::custom(
                "cannot decode source control location: expected a `local` or `remote` key",
            ))
        }
    }
}
