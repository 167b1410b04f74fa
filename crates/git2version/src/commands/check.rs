//! `semver-check` and `docker-tag-check`: validate a string.
//!
//! Both print `Valid version: <input>` or `Invalid version: <input>` and
//! exit 1 when the input is rejected.

use clap::Args;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, instrument};

use git2version_core::{ContainerTag, SemanticVersion};

/// Arguments for `semver-check`.
#[derive(Args, Debug)]
pub struct SemverCheckArgs {
    /// The version string to validate
    #[arg(value_name = "VERSION")]
    pub version: String,
}

/// Arguments for `docker-tag-check`.
#[derive(Args, Debug)]
pub struct DockerTagCheckArgs {
    /// The image tag to validate
    #[arg(value_name = "TAG")]
    pub tag: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct CheckOutput<'a> {
    input: &'a str,
    valid: bool,
}

/// Check `args.version` as a semantic version.
#[instrument(name = "cmd_semver_check", skip_all)]
pub fn cmd_semver_check(args: SemverCheckArgs, json: bool) -> anyhow::Result<ExitCode> {
    let valid = match SemanticVersion::parse(&args.version) {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "rejected");
            false
        }
    };
    report(&args.version, valid, json)
}

/// Check `args.tag` as a container image tag.
#[instrument(name = "cmd_docker_tag_check", skip_all)]
pub fn cmd_docker_tag_check(args: DockerTagCheckArgs, json: bool) -> anyhow::Result<ExitCode> {
    let valid = ContainerTag::is_valid(&args.tag);
    report(&args.tag, valid, json)
}

fn report(input: &str, valid: bool, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string(&CheckOutput { input, valid })?);
    } else if valid {
        println!(
            "{} {input}",
            "Valid version:".if_supports_color(Stream::Stdout, |t| t.green())
        );
    } else {
        println!(
            "{} {input}",
            "Invalid version:".if_supports_color(Stream::Stdout, |t| t.red())
        );
    }

    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
