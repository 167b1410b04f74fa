//! Command implementations

pub mod check;

pub mod docker_tag;

pub mod git_version;

pub mod semver;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use std::path::PathBuf;

/// Arguments shared by the commands that read a repository.
#[derive(Args, Debug, Default)]
pub struct RepoArgs {
    /// Repository directory (defaults to the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub directory: Option<PathBuf>,
}

impl RepoArgs {
    /// The directory to inspect, relative paths taken from `cwd`.
    pub fn resolve(&self, cwd: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
        let Some(ref dir) = self.directory else {
            return Ok(cwd.to_path_buf());
        };
        let dir = Utf8PathBuf::try_from(dir.clone())
            .with_context(|| format!("directory is not valid UTF-8: {}", dir.display()))?;
        Ok(cwd.join(dir))
    }
}
