//! Normalized facts about a checkout.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::git::{GitResult, RepositoryInspector};

/// Commit, branch and tag information read from a repository.
///
/// When `HEAD` carries exact tags the nearest-tag lookup is skipped, so
/// `nearest_tags` is empty and `commits_since_nearest` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryState {
    commit_id: String,
    branch: String,
    exact_tags: Vec<String>,
    nearest_tags: Vec<String>,
    commits_since_nearest: u64,
}

impl RepositoryState {
    /// Build a state from already-collected facts.
    ///
    /// Nearest-tag information is dropped when `exact_tags` is non-empty.
    pub fn new(
        commit_id: impl Into<String>,
        branch: impl Into<String>,
        exact_tags: Vec<String>,
        nearest_tags: Vec<String>,
        commits_since_nearest: u64,
    ) -> Self {
        let (nearest_tags, commits_since_nearest) = if exact_tags.is_empty() {
            (nearest_tags, commits_since_nearest)
        } else {
            (Vec::new(), 0)
        };

        Self {
            commit_id: commit_id.into(),
            branch: branch.into(),
            exact_tags,
            nearest_tags,
            commits_since_nearest,
        }
    }

    /// Collect the state through an inspector.
    ///
    /// The nearest-tag query only runs when no tag points at `HEAD`.
    #[instrument(skip_all)]
    pub fn inspect(inspector: &impl RepositoryInspector) -> GitResult<Self> {
        let commit_id = inspector.current_commit_id()?;
        let branch = inspector.current_branch()?;
        let exact_tags = inspector.tags_at(&commit_id)?;

        if !exact_tags.is_empty() {
            return Ok(Self::new(commit_id, branch, exact_tags, Vec::new(), 0));
        }

        let state = match inspector.nearest_ancestor_tag() {
            Some(nearest) => Self::new(
                commit_id,
                branch,
                Vec::new(),
                vec![nearest.name],
                nearest.distance,
            ),
            None => Self::new(commit_id, branch, Vec::new(), Vec::new(), 0),
        };
        debug!(?state, "repository state");
        Ok(state)
    }

    /// Abbreviated hash of the current commit.
    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    /// Current branch, empty when detached.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Tags pointing exactly at the current commit.
    pub fn exact_tags(&self) -> &[String] {
        &self.exact_tags
    }

    /// Nearest ancestor tags.
    pub fn nearest_tags(&self) -> &[String] {
        &self.nearest_tags
    }

    /// Commits between the nearest tag and the current commit.
    pub const fn commits_since_nearest(&self) -> u64 {
        self.commits_since_nearest
    }
}

impl fmt::Display for RepositoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "commit_id: {}", self.commit_id)?;
        writeln!(f, "branch: {}", self.branch)?;
        writeln!(f, "exact_tags: {}", self.exact_tags.join(", "))?;
        writeln!(f, "nearest_tags: {}", self.nearest_tags.join(", "))?;
        write!(f, "commits_since_nearest: {}", self.commits_since_nearest)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::git::{GitError, NearestTag};

    #[derive(Default)]
    struct FakeInspector {
        commit_id: &'static str,
        branch: &'static str,
        tags: Vec<&'static str>,
        nearest: Option<(&'static str, u64)>,
        describe_calls: Cell<usize>,
    }

    impl RepositoryInspector for FakeInspector {
        fn current_commit_id(&self) -> GitResult<String> {
            if self.commit_id.is_empty() {
                return Err(GitError::NotARepo);
            }
            Ok(self.commit_id.to_string())
        }

        fn current_branch(&self) -> GitResult<String> {
            Ok(self.branch.to_string())
        }

        fn tags_at(&self, commit_id: &str) -> GitResult<Vec<String>> {
            assert_eq!(commit_id, self.commit_id);
            Ok(self.tags.iter().map(ToString::to_string).collect())
        }

        fn nearest_ancestor_tag(&self) -> Option<NearestTag> {
            self.describe_calls.set(self.describe_calls.get() + 1);
            self.nearest.map(|(name, distance)| NearestTag {
                name: name.to_string(),
                distance,
            })
        }
    }

    #[test]
    fn exact_tag_skips_nearest_lookup() {
        let inspector = FakeInspector {
            commit_id: "acc33eb",
            branch: "main",
            tags: vec!["2.0.1"],
            nearest: Some(("2.0.0", 4)),
            ..Default::default()
        };

        let state = RepositoryState::inspect(&inspector).unwrap();
        assert_eq!(state.exact_tags(), ["2.0.1"]);
        assert!(state.nearest_tags().is_empty());
        assert_eq!(state.commits_since_nearest(), 0);
        assert_eq!(inspector.describe_calls.get(), 0);
    }

    #[test]
    fn nearest_tag_used_without_exact_tag() {
        let inspector = FakeInspector {
            commit_id: "abc1234",
            branch: "feature/x",
            nearest: Some(("1.4.2", 3)),
            ..Default::default()
        };

        let state = RepositoryState::inspect(&inspector).unwrap();
        assert_eq!(state.commit_id(), "abc1234");
        assert_eq!(state.branch(), "feature/x");
        assert!(state.exact_tags().is_empty());
        assert_eq!(state.nearest_tags(), ["1.4.2"]);
        assert_eq!(state.commits_since_nearest(), 3);
    }

    #[test]
    fn untagged_history() {
        let inspector = FakeInspector {
            commit_id: "acc33eb",
            branch: "test",
            ..Default::default()
        };

        let state = RepositoryState::inspect(&inspector).unwrap();
        assert_eq!(
            state,
            RepositoryState::new("acc33eb", "test", Vec::new(), Vec::new(), 0)
        );
    }

    #[test]
    fn inspector_errors_propagate() {
        let inspector = FakeInspector::default();
        assert!(matches!(
            RepositoryState::inspect(&inspector),
            Err(GitError::NotARepo)
        ));
    }

    #[test]
    fn new_drops_nearest_when_exact_tags_present() {
        let state = RepositoryState::new(
            "abc",
            "main",
            vec!["1.0.0".into()],
            vec!["0.9.0".into()],
            7,
        );
        assert!(state.nearest_tags().is_empty());
        assert_eq!(state.commits_since_nearest(), 0);
    }

    #[test]
    fn display_lists_every_field() {
        let state = RepositoryState::new("abc", "", Vec::new(), vec!["1.0.0".into()], 2);
        let text = state.to_string();
        assert!(text.contains("commit_id: abc"));
        assert!(text.contains("nearest_tags: 1.0.0"));
        assert!(text.ends_with("commits_since_nearest: 2"));
    }
}
