//! Library interface for the `git2version` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for documentation generation and testing. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations
//!
//! # Documentation Generation
//!
//! The [`command()`] function returns the clap `Command` for generating man pages
//! and shell completions via `xtask`.

pub mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                Log filter (e.g., debug, git2version_core=trace)
    GIT2VERSION_LOG_PATH    Write JSONL logs to this file
    GIT2VERSION_LOG_DIR     Write JSONL logs to git2version.jsonl in this directory
";

/// Command-line interface definition for git2version.
#[derive(Parser)]
#[command(name = "git2version")]
#[command(about = "Derive semantic versions and container image tags from git", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute. Help is printed when absent.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the git state versions are derived from
    GitVersion(commands::RepoArgs),

    /// Print the semantic version of the checkout
    Semver(commands::RepoArgs),

    /// Check whether a string is a valid semantic version
    SemverCheck(commands::check::SemverCheckArgs),

    /// Print the container image tag of the checkout
    DockerTag(commands::RepoArgs),

    /// Check whether a string is a valid container image tag
    DockerTagCheck(commands::check::DockerTagCheckArgs),
}

impl Commands {
    /// Repository arguments of the commands that inspect a checkout.
    pub const fn repo_args(&self) -> Option<&commands::RepoArgs> {
        match self {
            Self::GitVersion(args) | Self::Semver(args) | Self::DockerTag(args) => Some(args),
            Self::SemverCheck(_) | Self::DockerTagCheck(_) => None,
        }
    }
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn subcommand_names() {
        let names: Vec<_> = command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "git-version",
                "semver",
                "semver-check",
                "docker-tag",
                "docker-tag-check"
            ]
        );
    }

    #[test]
    fn check_commands_name_their_argument() {
        let cmd = command();
        let value_name = |sub: &str| {
            cmd.find_subcommand(sub)
                .and_then(|c| c.get_positionals().next())
                .and_then(|a| a.get_value_names())
                .map(|names| names[0].to_string())
        };
        assert_eq!(value_name("semver-check").as_deref(), Some("VERSION"));
        assert_eq!(value_name("docker-tag-check").as_deref(), Some("TAG"));
    }

    #[test]
    fn directory_flag_parses() {
        let cli = Cli::try_parse_from(["git2version", "semver", "-d", "/tmp/repo"]).unwrap();
        match cli.command {
            Some(Commands::Semver(args)) => {
                assert_eq!(args.directory, Some(PathBuf::from("/tmp/repo")));
            }
            _ => panic!("expected semver"),
        }
    }

    #[test]
    fn repo_args_only_for_repository_commands() {
        let parse = |args: &[&str]| {
            Cli::try_parse_from(args.iter().copied())
                .unwrap()
                .command
                .unwrap()
        };

        let docker = parse(&["git2version", "docker-tag", "-d", "repo"]);
        assert_eq!(
            docker.repo_args().and_then(|a| a.directory.clone()),
            Some(PathBuf::from("repo"))
        );
        assert!(parse(&["git2version", "git-version"]).repo_args().is_some());
        assert!(
            parse(&["git2version", "docker-tag-check", "1.2.3"])
                .repo_args()
                .is_none()
        );
    }

    #[test]
    fn no_subcommand_is_accepted() {
        let cli = Cli::try_parse_from(["git2version", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.json);
    }
}
