//! Semantic versions and their derivation from repository state.
//!
//! [`SemanticVersion`] wraps [`semver::Version`] so that every instance is
//! valid by construction and formats back to the exact text it was parsed
//! from. The [`resolve`] submodule maps a
//! [`RepositoryState`](crate::state::RepositoryState) to a version.

pub mod resolve;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// Text is not a `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` version.
    #[error("invalid semantic version '{input}': {source}")]
    Parse {
        /// The rejected text.
        input: String,
        /// Parser diagnostics.
        #[source]
        source: semver::Error,
    },

    /// A prerelease or build label contains invalid identifiers.
    #[error("invalid version label '{label}': {source}")]
    Label {
        /// The rejected label.
        label: String,
        /// Parser diagnostics.
        #[source]
        source: semver::Error,
    },

    /// The patch component is already `u64::MAX`.
    #[error("cannot bump patch of '{version}': component out of range")]
    Overflow {
        /// The version that could not be bumped.
        version: String,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// A `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` version.
///
/// Equality compares every component including build metadata. Use
/// [`SemanticVersion::cmp_precedence`] for release ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticVersion(Version);

impl SemanticVersion {
    /// A plain release version without labels.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// A version with optional prerelease and build labels.
    ///
    /// Empty labels are treated as absent.
    pub fn with_labels(
        major: u64,
        minor: u64,
        patch: u64,
        prerelease: Option<&str>,
        build: Option<&str>,
    ) -> VersionResult<Self> {
        let pre = match prerelease.filter(|label| !label.is_empty()) {
            Some(label) => Prerelease::new(label).map_err(|source| VersionError::Label {
                label: label.to_string(),
                source,
            })?,
            None => Prerelease::EMPTY,
        };
        let build = match build.filter(|label| !label.is_empty()) {
            Some(label) => BuildMetadata::new(label).map_err(|source| VersionError::Label {
                label: label.to_string(),
                source,
            })?,
            None => BuildMetadata::EMPTY,
        };

        Ok(Self(Version {
            major,
            minor,
            patch,
            pre,
            build,
        }))
    }

    /// Parse a version string.
    pub fn parse(text: &str) -> VersionResult<Self> {
        Version::parse(text)
            .map(Self)
            .map_err(|source| VersionError::Parse {
                input: text.to_string(),
                source,
            })
    }

    /// Major component.
    pub const fn major(&self) -> u64 {
        self.0.major
    }

    /// Minor component.
    pub const fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Patch component.
    pub const fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Prerelease label, if any.
    pub fn prerelease(&self) -> Option<&str> {
        Some(self.0.pre.as_str()).filter(|label| !label.is_empty())
    }

    /// Build metadata, if any.
    pub fn build(&self) -> Option<&str> {
        Some(self.0.build.as_str()).filter(|label| !label.is_empty())
    }

    /// Next patch release: `patch + 1`, labels cleared.
    ///
    /// Fails with [`VersionError::Overflow`] when the patch is `u64::MAX`.
    pub fn bump_patch(&self) -> VersionResult<Self> {
        let patch = self
            .0
            .patch
            .checked_add(1)
            .ok_or_else(|| VersionError::Overflow {
                version: self.to_string(),
            })?;
        Ok(Self::new(self.0.major, self.0.minor, patch))
    }

    /// Order by semantic-versioning precedence.
    ///
    /// Numeric components compare first; a prerelease sorts before the
    /// release with the same numbers; build metadata is ignored.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.0, &other.0);
        a.major
            .cmp(&b.major)
            .then(a.minor.cmp(&b.minor))
            .then(a.patch.cmp(&b.patch))
            .then_with(|| match (a.pre.is_empty(), b.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.pre.cmp(&b.pre),
            })
    }

    /// The underlying [`semver::Version`].
    pub const fn as_semver(&self) -> &Version {
        &self.0
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Version> for SemanticVersion {
    fn from(version: Version) -> Self {
        Self(version)
    }
}
