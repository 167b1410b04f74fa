//! `semver`: print the semantic version of the checkout.

use anyhow::Context;
use camino::Utf8Path;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, instrument};

use git2version_core::{Config, ResolveRules, SemanticVersion, pipeline};

use super::RepoArgs;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a SemanticVersion,
}

/// Resolve and print the semantic version.
#[instrument(name = "cmd_semver", skip_all)]
pub fn cmd_semver(
    args: RepoArgs,
    json: bool,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<ExitCode> {
    let dir = args.resolve(cwd)?;
    let rules = ResolveRules::from_config(config);
    debug!(%dir, ?rules, "resolving version");

    let version = pipeline::semantic_version(&dir, &rules)
        .with_context(|| format!("failed to resolve version of {dir}"))?;

    if json {
        println!(
            "{}",
            serde_json::to_string(&VersionOutput { version: &version })?
        );
    } else {
        println!("{version}");
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_output_shape() {
        let version = SemanticVersion::parse("1.2.3-dev.4+gabc").unwrap();
        let json = serde_json::to_value(VersionOutput { version: &version }).unwrap();
        assert_eq!(json, serde_json::json!({ "version": "1.2.3-dev.4+gabc" }));
    }
}
