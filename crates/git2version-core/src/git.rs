//! Git inspection for version resolution.
//!
//! Shells out to `git` for all lookups so the user's git installation,
//! configuration and safe-directory rules apply unchanged. The
//! [`RepositoryInspector`] trait is the seam the rest of the crate
//! depends on; [`GitCli`] is the subprocess implementation.

use std::process::Command;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument};

/// Name of the git executable looked up on `PATH`.
const GIT: &str = "git";

/// `git describe --tags` output: `<tag>-<distance>-g<hash>`.
///
/// The first group is greedy so tags that themselves contain `-`
/// (e.g. `1.0.0-rc.1`) are kept intact.
static DESCRIBE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-(\d+)-(.+)$").expect("valid describe pattern"));

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// The `git` executable is missing or the directory is unreadable.
    #[error("git not available: {0}")]
    NotAvailable(String),

    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "rev-parse").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,

    /// `git` succeeded but printed nothing where a value was required.
    #[error("git {command} returned no output")]
    EmptyOutput {
        /// The git subcommand that produced no output.
        command: String,
    },
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// The closest tag reachable from `HEAD` and how far behind it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearestTag {
    /// Tag name as printed by git.
    pub name: String,
    /// Number of commits between the tag and `HEAD`.
    pub distance: u64,
}

/// Source of the raw facts a [`RepositoryState`](crate::state::RepositoryState)
/// is built from.
pub trait RepositoryInspector {
    /// Abbreviated hash of `HEAD`.
    fn current_commit_id(&self) -> GitResult<String>;

    /// Name of the checked-out branch, empty on a detached `HEAD`.
    fn current_branch(&self) -> GitResult<String>;

    /// Tags pointing exactly at `commit_id`, in the order git lists them.
    fn tags_at(&self, commit_id: &str) -> GitResult<Vec<String>>;

    /// Nearest ancestor tag with its distance.
    ///
    /// Lookup failures are not errors: they are logged and reported as
    /// `None`, the same as a history without tags.
    fn nearest_ancestor_tag(&self) -> Option<NearestTag>;
}

/// [`RepositoryInspector`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    dir: Utf8PathBuf,
}

impl GitCli {
    /// Prepare to inspect the repository containing `dir`.
    ///
    /// Fails with [`GitError::NotAvailable`] when no `git` executable is
    /// on `PATH` or `dir` cannot be read.
    #[instrument]
    pub fn open(dir: &Utf8Path) -> GitResult<Self> {
        let git = which::which(GIT)
            .map_err(|e| GitError::NotAvailable(format!("command not available: {GIT} ({e})")))?;
        debug!(git = %git.display(), "found git executable");

        std::fs::read_dir(dir)
            .map_err(|e| GitError::NotAvailable(format!("no read access to {dir}: {e}")))?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Directory the git commands run in.
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Run a git command in the repository directory and return its stdout.
    fn git(&self, args: &[&str]) -> GitResult<String> {
        let output = Command::new(GIT)
            .args(args)
            .current_dir(&self.dir)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

            if stderr.contains("not a git repository") {
                return Err(GitError::NotARepo);
            }

            Err(GitError::Command {
                command: args.first().unwrap_or(&"").to_string(),
                stderr,
            })
        }
    }
}

impl RepositoryInspector for GitCli {
    #[instrument(skip(self), fields(dir = %self.dir))]
    fn current_commit_id(&self) -> GitResult<String> {
        let commit_id = self.git(&["rev-parse", "--short", "HEAD"])?.trim().to_string();
        if commit_id.is_empty() {
            return Err(GitError::EmptyOutput {
                command: "rev-parse".into(),
            });
        }
        debug!(%commit_id, "current commit");
        Ok(commit_id)
    }

    #[instrument(skip(self), fields(dir = %self.dir))]
    fn current_branch(&self) -> GitResult<String> {
        let branch = self.git(&["branch", "--show-current"])?.trim().to_string();
        if branch.is_empty() {
            debug!("detached HEAD");
        } else {
            debug!(%branch, "current branch");
        }
        Ok(branch)
    }

    #[instrument(skip(self), fields(dir = %self.dir))]
    fn tags_at(&self, commit_id: &str) -> GitResult<Vec<String>> {
        let output = self.git(&["tag", "--list", "--points-at", commit_id])?;
        let tags = non_empty_lines(&output);
        debug!(?tags, "tags at commit");
        Ok(tags)
    }

    #[instrument(skip(self), fields(dir = %self.dir))]
    fn nearest_ancestor_tag(&self) -> Option<NearestTag> {
        let output = match self.git(&["describe", "--tags"]) {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "git describe failed");
                return None;
            }
        };

        let nearest = parse_describe(&output);
        if nearest.is_none() {
            debug!(output = output.trim(), "could not parse git describe output");
        }
        nearest
    }
}

/// Parse `git describe --tags` output into a tag and distance.
///
/// Returns `None` for output without the `-<distance>-g<hash>` suffix,
/// which is what git prints when `HEAD` itself is tagged.
pub fn parse_describe(output: &str) -> Option<NearestTag> {
    let captures = DESCRIBE_PATTERN.captures(output.trim())?;
    let name = captures.get(1)?.as_str().to_string();
    let distance = captures.get(2)?.as_str().parse().ok()?;
    Some(NearestTag { name, distance })
}

fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
