//! Derive a semantic version from repository state.
//!
//! Rules, first match wins:
//!
//! 1. A tag on `HEAD` is the version.
//! 2. Otherwise the nearest ancestor tag, patch-bumped, labelled
//!    `-<kind>.<distance>+g<commit>`.
//! 3. Otherwise `0.0.0` with the same labels.
//!
//! `<kind>` is `pre` on release branches and `dev` everywhere else.
//! Multiple candidate tags are not an error: the first one is used and a
//! [`Diagnostic`] is reported through the caller's sink.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::config::{Config, ResolveConfig};
use crate::state::RepositoryState;
use crate::version::{SemanticVersion, VersionResult};

/// Prerelease label prefix on release branches.
const RELEASE_LABEL: &str = "pre";
/// Prerelease label prefix on every other branch.
const DEVELOPMENT_LABEL: &str = "dev";
/// Prefix git itself uses for abbreviated hashes in `describe` output.
const BUILD_PREFIX: &str = "g";

/// Branches that produce `pre` builds unless configured otherwise.
pub const DEFAULT_RELEASE_BRANCHES: &[&str] = &["main", "master"];
/// Branch-name prefix that marks a release branch unless configured otherwise.
pub const DEFAULT_RELEASE_PREFIX: &str = "release";

/// Which tag lookup produced more than one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    /// Tags pointing at `HEAD`.
    Exact,
    /// Nearest ancestor tags.
    Nearest,
}

impl fmt::Display for TagSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

/// Non-fatal findings reported while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// More than one tag matched; `chosen` is the one used.
    MultipleTags {
        /// Lookup that produced the tags.
        source: TagSource,
        /// All candidates, in the order supplied.
        tags: Vec<String>,
        /// The tag the version was derived from.
        chosen: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleTags {
                source,
                tags,
                chosen,
            } => write!(
                f,
                "more than one {source} tag available, using {chosen} of: {}",
                tags.join(", ")
            ),
        }
    }
}

/// Sink that forwards diagnostics to `tracing` at warn level.
pub fn log_diagnostic(diagnostic: Diagnostic) {
    match &diagnostic {
        Diagnostic::MultipleTags {
            source,
            tags,
            chosen,
        } => warn!(%source, ?tags, %chosen, "{diagnostic}"),
    }
}

/// Branch classification and tag handling used by [`VersionResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRules {
    release_branches: Vec<String>,
    release_prefix: String,
    tag_prefix: Option<String>,
}

impl Default for ResolveRules {
    fn default() -> Self {
        Self {
            release_branches: DEFAULT_RELEASE_BRANCHES
                .iter()
                .map(ToString::to_string)
                .collect(),
            release_prefix: DEFAULT_RELEASE_PREFIX.to_string(),
            tag_prefix: None,
        }
    }
}

impl ResolveRules {
    /// Rules from the `[resolve]` section of a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        config
            .resolve
            .as_ref()
            .map_or_else(Self::default, Self::from_section)
    }

    fn from_section(section: &ResolveConfig) -> Self {
        let defaults = Self::default();
        Self {
            release_branches: section
                .release_branches
                .clone()
                .unwrap_or(defaults.release_branches),
            release_prefix: section
                .release_prefix
                .clone()
                .unwrap_or(defaults.release_prefix),
            tag_prefix: section.tag_prefix.clone().filter(|p| !p.is_empty()),
        }
    }

    /// Replace the exact branch names treated as release branches.
    pub fn with_release_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.release_branches = branches.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the branch-name prefix that marks a release branch.
    pub fn with_release_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.release_prefix = prefix.into();
        self
    }

    /// Strip `prefix` from tags before parsing them (e.g. `"v"`).
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = Some(prefix.into()).filter(|p| !p.is_empty());
        self
    }

    /// Whether `branch` produces `pre` rather than `dev` builds.
    ///
    /// An empty branch (detached `HEAD`) is never a release branch.
    pub fn is_release_branch(&self, branch: &str) -> bool {
        if branch.is_empty() {
            return false;
        }
        self.release_branches.iter().any(|b| b == branch)
            || (!self.release_prefix.is_empty() && branch.starts_with(&self.release_prefix))
    }

    fn parse_tag(&self, tag: &str) -> VersionResult<SemanticVersion> {
        let text = self
            .tag_prefix
            .as_deref()
            .and_then(|prefix| tag.strip_prefix(prefix))
            .unwrap_or(tag);
        SemanticVersion::parse(text)
    }
}

/// Maps a [`RepositoryState`] to a [`SemanticVersion`].
#[derive(Debug, Clone, Default)]
pub struct VersionResolver {
    rules: ResolveRules,
}

impl VersionResolver {
    /// A resolver using `rules`.
    pub const fn new(rules: ResolveRules) -> Self {
        Self { rules }
    }

    /// The rules in use.
    pub const fn rules(&self) -> &ResolveRules {
        &self.rules
    }

    /// Resolve the version for `state`.
    ///
    /// Fails if the chosen tag is not a valid semantic version, or if a
    /// nearest tag's patch cannot be bumped.
    pub fn resolve(
        &self,
        state: &RepositoryState,
        sink: &mut dyn FnMut(Diagnostic),
    ) -> VersionResult<SemanticVersion> {
        if let Some(tag) = first_tag(state.exact_tags(), TagSource::Exact, sink) {
            return self.rules.parse_tag(tag);
        }

        let kind = if self.rules.is_release_branch(state.branch()) {
            RELEASE_LABEL
        } else {
            DEVELOPMENT_LABEL
        };
        let prerelease = format!("{kind}.{}", state.commits_since_nearest());
        let build = format!("{BUILD_PREFIX}{}", state.commit_id());

        let base = match first_tag(state.nearest_tags(), TagSource::Nearest, sink) {
            Some(tag) => self.rules.parse_tag(tag)?.bump_patch()?,
            None => SemanticVersion::new(0, 0, 0),
        };

        SemanticVersion::with_labels(
            base.major(),
            base.minor(),
            base.patch(),
            Some(&prerelease),
            Some(&build),
        )
    }
}

/// Pick the first tag, reporting ambiguity through `sink`.
fn first_tag<'a>(
    tags: &'a [String],
    source: TagSource,
    sink: &mut dyn FnMut(Diagnostic),
) -> Option<&'a str> {
    let chosen = tags.first()?;
    if tags.len() > 1 {
        sink(Diagnostic::MultipleTags {
            source,
            tags: tags.to_vec(),
            chosen: chosen.clone(),
        });
    }
    Some(chosen)
}
