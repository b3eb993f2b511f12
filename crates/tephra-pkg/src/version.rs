//! Half-open version range helpers.
//!
//! Dependency requirements express ranges as `[lower, upper)`: the lower
//! bound is included, the upper bound excluded. The helpers here derive the
//! conventional "compatible with" ranges from a base version by bumping one
//! component and zeroing everything below it, so the base version itself is
//! always inside the range and the bumped boundary is always outside it.

use semver::Version;
use std::ops::Range;

/// The range from `version` up to (but excluding) the next major version.
///
/// `up_to_next_major(1.2.3)` is `1.2.3..2.0.0`.
#[must_use]
pub fn up_to_next_major(version: Version) -> Range<Version> {
    let upper = Version::new(version.major + 1, 0, 0);
    version..upper
}

/// The range from `version` up to (but excluding) the next minor version.
///
/// `up_to_next_minor(1.2.3)` is `1.2.3..1.3.0`.
#[must_use]
pub fn up_to_next_minor(version: Version) -> Range<Version> {
    let upper = Version::new(version.major, version.minor + 1, 0);
    version..upper
}
