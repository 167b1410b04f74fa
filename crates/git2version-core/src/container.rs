//! Container image tags derived from semantic versions.
//!
//! Registry tags allow only ASCII letters, digits, `_`, `.` and `-`, so
//! the `+` separating semver build metadata cannot appear in a tag. A
//! [`ContainerTag`] is `MAJOR.MINOR.PATCH[-ADDITIONAL]` with the charset
//! checked when the value is created.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::version::SemanticVersion;

/// Numeric triple followed by anything.
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(\d+)\.(\d+)\.(\d+)(.*)$").expect("valid container tag pattern")
});

/// Errors from container tag construction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TagError {
    /// The suffix contains non-ASCII characters.
    #[error("invalid additional '{additional}': contains non-ASCII characters")]
    NonAscii {
        /// The rejected suffix.
        additional: String,
    },

    /// The suffix contains a character registries reject.
    #[error("invalid additional '{additional}': '{character}' not in [a-zA-Z0-9_.-]")]
    InvalidCharacter {
        /// The rejected suffix.
        additional: String,
        /// First offending character.
        character: char,
    },

    /// The text does not start with `MAJOR.MINOR.PATCH`.
    #[error("invalid container tag '{0}': expected MAJOR.MINOR.PATCH[-ADDITIONAL]")]
    Format(String),
}

/// Result alias for container tag operations.
pub type TagResult<T> = Result<T, TagError>;

/// An image tag of the form `MAJOR.MINOR.PATCH[-ADDITIONAL]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContainerTag {
    major: u64,
    minor: u64,
    patch: u64,
    additional: Option<String>,
}

impl ContainerTag {
    /// Create a tag, validating `additional`.
    ///
    /// An empty `additional` is the same as none.
    pub fn new(major: u64, minor: u64, patch: u64, additional: Option<&str>) -> TagResult<Self> {
        let additional = additional.filter(|a| !a.is_empty());
        if let Some(additional) = additional {
            validate_additional(additional)?;
        }

        Ok(Self {
            major,
            minor,
            patch,
            additional: additional.map(ToString::to_string),
        })
    }

    /// Derive a tag from a semantic version.
    ///
    /// The prerelease and build labels are joined with `-`, any `+` in
    /// them becomes `-`, and leading or trailing `-` are stripped.
    pub fn from_semantic_version(version: &SemanticVersion) -> TagResult<Self> {
        let labels: Vec<String> = [version.prerelease(), version.build()]
            .into_iter()
            .flatten()
            .map(|label| label.replace('+', "-"))
            .filter(|label| !label.is_empty())
            .collect();
        let joined = labels.join("-");
        let additional = joined.trim_matches('-');

        Self::new(
            version.major(),
            version.minor(),
            version.patch(),
            Some(additional),
        )
    }

    /// Parse `MAJOR.MINOR.PATCH[-ADDITIONAL]`.
    ///
    /// A single `-` after the numeric triple separates a non-empty
    /// suffix; any other trailing text is rejected. This is deliberately
    /// stricter than a bare `\d+.\d+.\d+` prefix match, so `1.2.3abc`,
    /// `1.2.3-` and `1.2.3.4` are not tags.
    pub fn parse(text: &str) -> TagResult<Self> {
        let format_error = || TagError::Format(text.to_string());

        let captures = TAG_PATTERN.captures(text).ok_or_else(format_error)?;
        let number = |i: usize| -> TagResult<u64> {
            captures
                .get(i)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(format_error)
        };
        let (major, minor, patch) = (number(1)?, number(2)?, number(3)?);

        let rest = captures.get(4).map_or("", |m| m.as_str());
        let additional = if rest.is_empty() {
            None
        } else {
            let suffix = rest.strip_prefix('-').filter(|s| !s.is_empty());
            Some(suffix.ok_or_else(format_error)?)
        };

        Self::new(major, minor, patch, additional)
    }

    /// Whether `text` is a valid tag. Never fails.
    pub fn is_valid(text: &str) -> bool {
        match Self::parse(text) {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "invalid container tag");
                false
            }
        }
    }

    /// Major component.
    pub const fn major(&self) -> u64 {
        self.major
    }

    /// Minor component.
    pub const fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch component.
    pub const fn patch(&self) -> u64 {
        self.patch
    }

    /// Suffix after the numeric triple, if any.
    pub fn additional(&self) -> Option<&str> {
        self.additional.as_deref()
    }
}

impl fmt::Display for ContainerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref additional) = self.additional {
            write!(f, "-{additional}")?;
        }
        Ok(())
    }
}

impl TryFrom<&SemanticVersion> for ContainerTag {
    type Error = TagError;

    fn try_from(version: &SemanticVersion) -> Result<Self, Self::Error> {
        Self::from_semantic_version(version)
    }
}

fn validate_additional(additional: &str) -> TagResult<()> {
    if !additional.is_ascii() {
        return Err(TagError::NonAscii {
            additional: additional.to_string(),
        });
    }

    if let Some(character) = additional
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(TagError::InvalidCharacter {
            additional: additional.to_string(),
            character,
        });
    }

    Ok(())
}
