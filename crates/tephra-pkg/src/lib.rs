//! Dependency model for the Tephra programming language.
//!
//! This crate provides:
//! - The dependency specification value a manifest declares per dependency
//!   (filesystem path, source-control location, or registry)
//! - Requirement variants (exact version, half-open range, revision, branch)
//! - Product filters and the `filtered` projection used by the build graph
//! - Default package-name derivation for dependencies without explicit names
//! - The canonical discriminated-container wire encoding
//! - Half-open version range helpers ("up to next major/minor")
//!
//! Everything here is a pure value type: no I/O, no async, freely shared
//! across threads. Manifest parsing constructs these values and the
//! resolver consumes them.

mod dependency;
mod filter;
mod identity;
mod location;
mod version;

pub use dependency::{PackageDependency, RegistryRequirement, SourceControlRequirement};
pub use filter::ProductFilter;
pub use identity::PackageIdentity;
pub use location::{SourceControlLocation, SourceControlUrl};
pub use version::{up_to_next_major, up_to_next_minor};
