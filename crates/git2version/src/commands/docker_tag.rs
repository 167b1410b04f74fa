//! `docker-tag`: print the container image tag of the checkout.

use anyhow::Context;
use camino::Utf8Path;
use serde::Serialize;
use std::process::ExitCode;
use tracing::instrument;

use git2version_core::{Config, ResolveRules, pipeline};

use super::RepoArgs;

#[derive(Serialize)]
struct TagOutput {
    tag: String,
}

/// Resolve the version and print it as an image tag.
#[instrument(name = "cmd_docker_tag", skip_all)]
pub fn cmd_docker_tag(
    args: RepoArgs,
    json: bool,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<ExitCode> {
    let dir = args.resolve(cwd)?;
    let tag = pipeline::container_tag(&dir, &ResolveRules::from_config(config))
        .with_context(|| format!("failed to derive container tag of {dir}"))?;

    if json {
        let output = TagOutput {
            tag: tag.to_string(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{tag}");
    }

    Ok(ExitCode::SUCCESS)
}
