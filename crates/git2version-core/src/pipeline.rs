//! Directory → state → version → tag.
//!
//! Thin composition of [`GitCli`], [`RepositoryState`],
//! [`VersionResolver`] and [`ContainerTag`] for callers that start from a
//! path. Multiple-tag diagnostics are logged with [`log_diagnostic`].

use camino::Utf8Path;
use tracing::{debug, instrument};

use crate::container::ContainerTag;
use crate::error::Result;
use crate::git::{GitCli, GitResult, RepositoryInspector};
use crate::state::RepositoryState;
use crate::version::SemanticVersion;
use crate::version::resolve::{ResolveRules, VersionResolver, log_diagnostic};

/// Read the repository state of the checkout containing `dir`.
#[instrument]
pub fn repository_state(dir: &Utf8Path) -> GitResult<RepositoryState> {
    let git = GitCli::open(dir)?;
    RepositoryState::inspect(&git)
}

/// Resolve the semantic version of the checkout containing `dir`.
#[instrument(skip(rules))]
pub fn semantic_version(dir: &Utf8Path, rules: &ResolveRules) -> Result<SemanticVersion> {
    let git = GitCli::open(dir)?;
    semantic_version_with(&git, rules)
}

/// Resolve the container tag of the checkout containing `dir`.
#[instrument(skip(rules))]
pub fn container_tag(dir: &Utf8Path, rules: &ResolveRules) -> Result<ContainerTag> {
    let git = GitCli::open(dir)?;
    container_tag_with(&git, rules)
}

/// [`semantic_version`] over any inspector.
pub fn semantic_version_with(
    inspector: &impl RepositoryInspector,
    rules: &ResolveRules,
) -> Result<SemanticVersion> {
    let state = RepositoryState::inspect(inspector)?;
    let version = VersionResolver::new(rules.clone()).resolve(&state, &mut log_diagnostic)?;
    debug!(%version, "resolved version");
    Ok(version)
}

/// [`container_tag`] over any inspector.
pub fn container_tag_with(
    inspector: &impl RepositoryInspector,
    rules: &ResolveRules,
) -> Result<ContainerTag> {
    let version = semantic_version_with(inspector, rules)?;
    let tag = ContainerTag::from_semantic_version(&version)?;
    debug!(%tag, "derived container tag");
    Ok(tag)
}
