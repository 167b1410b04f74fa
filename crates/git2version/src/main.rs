//! git2version CLI
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use git2version::{Cli, Commands, commands};
use git2version_core::config::ConfigLoader;
use std::process::ExitCode;
use tracing::debug;

mod observability;

/// Exit status when no subcommand is given.
const EXIT_USAGE: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.color.apply();

    let Some(command) = cli.command else {
        git2version::command()
            .print_help()
            .context("failed to print help")?;
        println!();
        return Ok(ExitCode::from(EXIT_USAGE));
    };

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = camino::Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;
    // Project config is searched from the inspected checkout.
    let search_root = match command.repo_args() {
        Some(args) => args.resolve(&cwd)?,
        None => cwd.clone(),
    };
    let mut loader = ConfigLoader::new().with_project_search(&search_root);
    if let Some(ref config_path) = cli.config {
        let config_path = camino::Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let config = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::from_env_with_overrides(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    );
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let _guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        %search_root,
        "CLI initialized"
    );

    let result = match command {
        Commands::GitVersion(args) => commands::git_version::cmd_git_version(args, cli.json, &cwd),
        Commands::Semver(args) => commands::semver::cmd_semver(args, cli.json, &config, &cwd),
        Commands::SemverCheck(args) => commands::check::cmd_semver_check(args, cli.json),
        Commands::DockerTag(args) => {
            commands::docker_tag::cmd_docker_tag(args, cli.json, &config, &cwd)
        }
        Commands::DockerTagCheck(args) => commands::check::cmd_docker_tag_check(args, cli.json),
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
