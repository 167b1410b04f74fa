//! `git-version`: show the repository facts versions are derived from.

use anyhow::Context;
use camino::Utf8Path;
use std::process::ExitCode;
use tracing::instrument;

use git2version_core::pipeline;

use super::RepoArgs;

/// Print the repository state of the checkout.
#[instrument(name = "cmd_git_version", skip_all)]
pub fn cmd_git_version(args: RepoArgs, json: bool, cwd: &Utf8Path) -> anyhow::Result<ExitCode> {
    let dir = args.resolve(cwd)?;
    let state = pipeline::repository_state(&dir)
        .with_context(|| format!("failed to read git state of {dir}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{state}");
    }

    Ok(ExitCode::SUCCESS)
}
