//! The dependency specification model.
//!
//! A [`PackageDependency`] is the immutable value a manifest produces for
//! each declared dependency: where the package comes from (filesystem path,
//! source-control location, or registry), which versions or revisions are
//! acceptable, and which of its products the declaring package may see.
//! The resolver groups these values by identity; the build-graph builder
//! narrows them with [`PackageDependency::filtered`].
//!
//! The wire encoding is a discriminated container keyed by source kind
//! (`fileSystem`, `sourceControl`, `registry`), with the same single-key
//! pattern repeated for requirements and locations. Key names are a
//! compatibility surface shared with every tool that reads lockfiles and
//! resolved-graph dumps, so the serde impls are written by hand and pinned
//! by snapshot tests.

use crate::filter::ProductFilter;
use crate::identity::PackageIdentity;
use crate::location::{default_name_for_path, SourceControlLocation, SourceControlUrl};
use semver::Version;
use serde::de;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Range;
use std::path::PathBuf;

/// One declared dependency of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageDependency {
    /// A package vendored at a local filesystem path, always built from
    /// whatever is on disk.
    FileSystem {
        identity: PackageIdentity,
        name: Option<String>,
        path: PathBuf,
        product_filter: ProductFilter,
    },
    /// A package fetched from a source-control repository.
    SourceControl {
        identity: PackageIdentity,
        name: Option<String>,
        location: SourceControlLocation,
        requirement: SourceControlRequirement,
        product_filter: ProductFilter,
    },
    /// A package downloaded from a registry.
    Registry {
        identity: PackageIdentity,
        requirement: RegistryRequirement,
        product_filter: ProductFilter,
    },
}

impl PackageDependency {
    /// A dependency on a package at a local filesystem path.
    #[must_use]
    pub fn file_system(
        identity: PackageIdentity,
        name: Option<String>,
        path: impl Into<PathBuf>,
        product_filter: ProductFilter,
    ) -> Self {
        Self::FileSystem {
            identity,
            name,
            path: path.into(),
            product_filter,
        }
    }

    /// A dependency on a source-control repository.
    #[must_use]
    pub fn source_control(
        identity: PackageIdentity,
        name: Option<String>,
        location: SourceControlLocation,
        requirement: SourceControlRequirement,
        product_filter: ProductFilter,
    ) -> Self {
        Self::SourceControl {
            identity,
            name,
            location,
            requirement,
            product_filter,
        }
    }

    /// A dependency on a repository cloned from the local filesystem.
    #[must_use]
    pub fn local_source_control(
        identity: PackageIdentity,
        name: Option<String>,
        path: impl Into<PathBuf>,
        requirement: SourceControlRequirement,
        product_filter: ProductFilter,
    ) -> Self {
        Self::source_control(
            identity,
            name,
            SourceControlLocation::Local(path.into()),
            requirement,
            product_filter,
        )
    }

    /// A dependency on a repository cloned from a remote URL.
    #[must_use]
    pub fn remote_source_control(
        identity: PackageIdentity,
        name: Option<String>,
        url: impl Into<SourceControlUrl>,
        requirement: SourceControlRequirement,
        product_filter: ProductFilter,
    ) -> Self {
        Self::source_control(
            identity,
            name,
            SourceControlLocation::Remote(url.into()),
            requirement,
            product_filter,
        )
    }

    /// A dependency on a registry package.
    #[must_use]
    pub fn registry(
        identity: PackageIdentity,
        requirement: RegistryRequirement,
        product_filter: ProductFilter,
    ) -> Self {
        Self::Registry {
            identity,
            requirement,
            product_filter,
        }
    }

    /// The identity the resolver deduplicates by.
    ///
    /// Two dependencies with equal identity but different requirements are
    /// the same package under different constraints, not different packages.
    #[must_use]
    pub fn identity(&self) -> &PackageIdentity {
        match self {
            Self::FileSystem { identity, .. }
            | Self::SourceControl { identity, .. }
            | Self::Registry { identity, .. } => identity,
        }
    }

    #[must_use]
    pub fn product_filter(&self) -> &ProductFilter {
        match self {
            Self::FileSystem { product_filter, .. }
            | Self::SourceControl { product_filter, .. }
            | Self::Registry { product_filter, .. } => product_filter,
        }
    }

    /// The name targets resolve against, never the authoritative package
    /// name. Uses the declared name when present, otherwise derives one:
    /// the final path component for filesystem and local source-control
    /// dependencies, the URL's last path component with `.git` stripped
    /// for remote ones, and the identity string for registry dependencies.
    #[must_use]
    pub fn name_for_target_dependency_resolution_only(&self) -> String {
        match self {
            Self::FileSystem { name, path, .. } => name
                .clone()
                .unwrap_or_else(|| default_name_for_path(path)),
            Self::SourceControl { name, location, .. } => name
                .clone()
                .unwrap_or_else(|| location.default_package_name()),
            Self::Registry { identity, .. } => identity.as_str().to_owned(),
        }
    }

    /// The declared name exactly as the manifest spelled it, if any.
    /// Registry dependencies never declare one.
    #[must_use]
    pub fn explicit_name_for_target_dependency_resolution_only(&self) -> Option<&str> {
        match self {
            Self::FileSystem { name, .. } | Self::SourceControl { name, .. } => name.as_deref(),
            Self::Registry { .. } => None,
        }
    }

    /// The same dependency with its product filter replaced.
    ///
    /// A pure projection: identity, location, and requirement are carried
    /// over untouched, and filtering an already-filtered value replaces
    /// the filter rather than intersecting it.
    #[must_use]
    pub fn filtered(self, product_filter: ProductFilter) -> Self {
        match self {
            Self::FileSystem {
                identity,
                name,
                path,
                ..
            } => Self::FileSystem {
                identity,
                name,
                path,
                product_filter,
            },
            Self::SourceControl {
                identity,
                name,
                location,
                requirement,
                ..
            } => Self::SourceControl {
                identity,
                name,
                location,
                requirement,
                product_filter,
            },
            Self::Registry {
                identity,
                requirement,
                ..
            } => Self::Registry {
                identity,
                requirement,
                product_filter,
            },
        }
    }
}

impl std::fmt::Display for PackageDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileSystem { identity, path, .. } => {
                write!(f, "{identity} at {}", path.display())
            }
            Self::SourceControl {
                identity,
                location,
                requirement,
                ..
            } => write!(f, "{identity} from {location} ({requirement})"),
            Self::Registry {
                identity,
                requirement,
                ..
            } => write!(f, "{identity} ({requirement})"),
        }
    }
}

/// What a source-control dependency may resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceControlRequirement {
    /// Exactly one version.
    Exact(Version),
    /// Any version in a half-open `[lower, upper)` range.
    Range(Range<Version>),
    /// A pinned revision identifier, typically a commit hash.
    Revision(String),
    /// Whatever a branch currently points at.
    Branch(String),
}

impl SourceControlRequirement {
    /// Any version from `version` up to, excluding, the next major.
    #[must_use]
    pub fn up_to_next_major(version: Version) -> Self {
        Self::Range(crate::version::up_to_next_major(version))
    }

    /// Any version from `version` up to, excluding, the next minor.
    #[must_use]
    pub fn up_to_next_minor(version: Version) -> Self {
        Self::Range(crate::version::up_to_next_minor(version))
    }
}

impl std::fmt::Display for SourceControlRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(version) => write!(f, "exact:{version}"),
            Self::Range(range) => write!(f, "range:{}..{}", range.start, range.end),
            Self::Revision(revision) => write!(f, "revision:{revision}"),
            Self::Branch(branch) => write!(f, "branch:{branch}"),
        }
    }
}

/// What a registry dependency may resolve to. Registries serve released
/// versions only, so there is no revision or branch form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryRequirement {
    /// Exactly one version.
    Exact(Version),
    /// Any version in a half-open `[lower, upper)` range.
    Range(Range<Version>),
}

impl RegistryRequirement {
    /// Any version from `version` up to, excluding, the next major.
    #[must_use]
    pub fn up_to_next_major(version: Version) -> Self {
        Self::Range(crate::version::up_to_next_major(version))
    }

    /// Any version from `version` up to, excluding, the next minor.
    #[must_use]
    pub fn up_to_next_minor(version: Version) -> Self {
        Self::Range(crate::version::up_to_next_minor(version))
    }
}

impl std::fmt::Display for RegistryRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(version) => write!(f, "exact:{version}"),
            Self::Range(range) => write!(f, "range:{}..{}", range.start, range.end),
        }
    }
}

// Wire representation.
//
// Every container is a map with exactly one known key; decoding tries the
// known keys in a fixed priority order, ignores unknown keys, and rejects
// containers with no known key at all. Ranges always encode as an explicit
// bound pair so the format stays language-agnostic.

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeRepr {
    lower_bound: Version,
    upper_bound: Version,
}

impl From<&Range<Version>> for RangeRepr {
    fn from(range: &Range<Version>) -> Self {
        Self {
            lower_bound: range.start.clone(),
            upper_bound: range.end.clone(),
        }
    }
}

impl From<RangeRepr> for Range<Version> {
    fn from(repr: RangeRepr) -> Self {
        repr.lower_bound..repr.upper_bound
    }
}

impl Serialize for SourceControlRequirement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Exact(version) => map.serialize_entry("exact", version)?,
            Self::Range(range) => map.serialize_entry("range", &RangeRepr::from(range))?,
            Self::Revision(revision) => map.serialize_entry("revision", revision)?,
            Self::Branch(branch) => map.serialize_entry("branch", branch)?,
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct SourceControlRequirementRepr {
    exact: Option<Version>,
    range: Option<RangeRepr>,
    revision: Option<String>,
    branch: Option<String>,
}

impl<'de> Deserialize<'de> for SourceControlRequirement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = SourceControlRequirementRepr::deserialize(deserializer)?;
        if let Some(version) = repr.exact {
            Ok(Self::Exact(version))
        } else if let Some(range) = repr.range {
            Ok(Self::Range(range.into()))
        } else if let Some(revision) = repr.revision {
            Ok(Self::Revision(revision))
        } else if let Some(branch) = repr.branch {
            Ok(Self::Branch(branch))
        } else {
            Err(de::Error::custom(
                "cannot decode source control requirement: expected one of \
                 `exact`, `range`, `revision`, `branch`",
            ))
        }
    }
}

impl Serialize for RegistryRequirement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Exact(version) => map.serialize_entry("exact", version)?,
            Self::Range(range) => map.serialize_entry("range", &RangeRepr::from(range))?,
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct RegistryRequirementRepr {
    exact: Option<Version>,
    range: Option<RangeRepr>,
}

impl<'de> Deserialize<'de> for RegistryRequirement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = RegistryRequirementRepr::deserialize(deserializer)?;
        if let Some(version) = repr.exact {
            Ok(Self::Exact(version))
        } else if let Some(range) = repr.range {
            Ok(Self::Range(range.into()))
        } else {
            Err(de::Error::custom(
                "cannot decode registry requirement: expected an `exact` or `range` key",
            ))
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileSystemRepr {
    identity: PackageIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    path: PathBuf,
    product_filter: ProductFilter,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceControlRepr {
    identity: PackageIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    location: SourceControlLocation,
    requirement: SourceControlRequirement,
    product_filter: ProductFilter,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryRepr {
    identity: PackageIdentity,
    requirement: RegistryRequirement,
    product_filter: ProductFilter,
}

impl Serialize for PackageDependency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self.clone() {
            Self::FileSystem {
                identity,
                name,
                path,
                product_filter,
            } => map.serialize_entry(
                "fileSystem",
                &FileSystemRepr {
                    identity,
                    name,
                    path,
                    product_filter,
                },
            )?,
            Self::SourceControl {
                identity,
                name,
                location,
                requirement,
                product_filter,
            } => map.serialize_entry(
                "sourceControl",
                &SourceControlRepr {
                    identity,
                    name,
                    location,
                    requirement,
                    product_filter,
                },
            )?,
            Self::Registry {
                identity,
                requirement,
                product_filter,
            } => map.serialize_entry(
                "registry",
                &RegistryRepr {
                    identity,
                    requirement,
                    product_filter,
                },
            )?,
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependencyRepr {
    file_system: Option<FileSystemRepr>,
    source_control: Option<SourceControlRepr>,
    registry: Option<RegistryRepr>,
}

impl<'de> Deserialize<'de> for PackageDependency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = DependencyRepr::deserialize(deserializer)?;
        if let Some(fs) = repr.file_system {
            Ok(Self::FileSystem {
                identity: fs.identity,
                name: fs.name,
                path: fs.path,
                product_filter: fs.product_filter,
            })
        } else if let Some(sc) = repr.source_control {
            Ok(Self::SourceControl {
                identity: sc.identity,
                name: sc.name,
                location: sc.location,
                requirement: sc.requirement,
                product_filter: sc.product_filter,
            })
        } else if let Some(reg) = repr.registry {
            Ok(Self::Registry {
                identity: reg.identity,
                requirement: reg.requirement,
                product_filter: reg.product_filter,
            })
        } else {
            Err(de::Error::custom(
                "cannot decode package dependency: expected one of \
                 `fileSystem`, `sourceControl`, `registry`",
            ))
        }
    }
}
