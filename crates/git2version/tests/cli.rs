//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("GIT2VERSION_LOG_PATH")
        .env_remove("GIT2VERSION_LOG_DIR");
    cmd
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

/// A fresh repository on `main` with one commit.
fn repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["config", "tag.gpgsign", "false"]);
    commit(dir, "initial");
    tmp
}

fn commit(dir: &Path, message: &str) {
    git(dir, &["commit", "-q", "--allow-empty", "-m", message]);
}

fn short_head(dir: &Path) -> String {
    git(dir, &["rev-parse", "--short", "HEAD"])
}

/// Run a repository command against `dir`, returning trimmed stdout.
fn run_in(dir: &Path, args: &[&str]) -> String {
    let output = cmd()
        .args(args)
        .args(["-d", dir.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).unwrap().trim().to_string()
}

macro_rules! require_git {
    () => {
        if !git_available() {
            eprintln!("git not installed; skipping");
            return;
        }
    };
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("docker-tag-check"))
        .stdout(predicate::str::contains("GIT2VERSION_LOG_DIR"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_subcommand_prints_help_and_exits_2() {
    cmd()
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("semver-check"));
}

#[test]
fn unknown_subcommand_fails() {
    cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// =============================================================================
// Check Commands
// =============================================================================

#[test]
fn semver_check_valid() {
    cmd()
        .args(["semver-check", "1.2.3-pre.4+gabc123"])
        .assert()
        .success()
        .stdout("Valid version: 1.2.3-pre.4+gabc123\n");
}

#[test]
fn semver_check_invalid() {
    cmd()
        .args(["semver-check", "v1.2"])
        .assert()
        .code(1)
        .stdout("Invalid version: v1.2\n");
}

#[test]
fn semver_check_requires_argument() {
    cmd().arg("semver-check").assert().failure();
}

#[test]
fn docker_tag_check_valid() {
    cmd()
        .args(["docker-tag-check", "1.2.3-dev.1-gabc"])
        .assert()
        .success()
        .stdout("Valid version: 1.2.3-dev.1-gabc\n");
}

#[test]
fn docker_tag_check_rejects_build_separator() {
    cmd()
        .args(["docker-tag-check", "1.2.3+gabc"])
        .assert()
        .code(1)
        .stdout("Invalid version: 1.2.3+gabc\n");
}

#[test]
fn check_json_output() {
    let output = cmd()
        .args(["--json", "docker-tag-check", "latest"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value, serde_json::json!({ "input": "latest", "valid": false }));
}

#[test]
fn color_never_emits_plain_text() {
    cmd()
        .args(["--color", "never", "semver-check", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}[").not());
}

// =============================================================================
// Repository Commands
// =============================================================================

#[test]
fn outside_a_repository_fails() {
    require_git!();
    let tmp = TempDir::new().unwrap();

    cmd()
        .args(["semver", "-d", tmp.path().to_str().unwrap()])
        .env("GIT_CEILING_DIRECTORIES", tmp.path().parent().unwrap())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn missing_directory_fails() {
    cmd()
        .args(["docker-tag", "-d", "/nonexistent/git2version/checkout"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("git not available"));
}

#[test]
fn untagged_main_is_prerelease_zero() {
    require_git!();
    let repo = repo();
    let head = short_head(repo.path());

    assert_eq!(
        run_in(repo.path(), &["semver"]),
        format!("0.0.0-pre.0+g{head}")
    );
    assert_eq!(
        run_in(repo.path(), &["docker-tag"]),
        format!("0.0.0-pre.0-g{head}")
    );
}

#[test]
fn exact_tag_is_the_version() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "1.2.3"]);

    assert_eq!(run_in(repo.path(), &["semver"]), "1.2.3");
    assert_eq!(run_in(repo.path(), &["docker-tag"]), "1.2.3");
}

#[test]
fn commits_after_tag_on_main() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "1.2.3"]);
    commit(repo.path(), "second");
    commit(repo.path(), "third");
    let head = short_head(repo.path());

    assert_eq!(
        run_in(repo.path(), &["semver"]),
        format!("1.2.4-pre.2+g{head}")
    );
    assert_eq!(
        run_in(repo.path(), &["docker-tag"]),
        format!("1.2.4-pre.2-g{head}")
    );
}

#[test]
fn feature_branch_is_development() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "0.4.0"]);
    git(repo.path(), &["checkout", "-q", "-b", "feature/login"]);
    commit(repo.path(), "work");
    let head = short_head(repo.path());

    assert_eq!(
        run_in(repo.path(), &["semver"]),
        format!("0.4.1-dev.1+g{head}")
    );
}

#[test]
fn release_prefixed_branch_is_release() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "2.0.0"]);
    git(repo.path(), &["checkout", "-q", "-b", "release-2.0"]);
    commit(repo.path(), "fix");

    assert!(run_in(repo.path(), &["semver"]).starts_with("2.0.1-pre.1+g"));
}

#[test]
fn detached_head_is_development() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "1.0.0"]);
    commit(repo.path(), "next");
    let head = short_head(repo.path());
    git(repo.path(), &["checkout", "-q", "--detach", "HEAD"]);

    assert_eq!(
        run_in(repo.path(), &["semver"]),
        format!("1.0.1-dev.1+g{head}")
    );
}

#[test]
fn malformed_exact_tag_fails() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "not-a-version"]);

    cmd()
        .args(["semver", "-d", repo.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not-a-version"));
}

#[test]
fn multiple_exact_tags_warn_and_pick_first() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "1.0.0"]);
    git(repo.path(), &["tag", "1.1.0"]);

    cmd()
        .args(["semver", "-d", repo.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout("1.0.0\n")
        .stderr(predicate::str::contains("more than one exact tag"));
}

#[test]
fn quiet_suppresses_multiple_tag_warning() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "1.0.0"]);
    git(repo.path(), &["tag", "1.1.0"]);

    cmd()
        .args(["-q", "semver", "-d", repo.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn git_version_prints_state() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "3.1.4"]);
    commit(repo.path(), "next");
    let head = short_head(repo.path());

    cmd()
        .args(["git-version", "-d", repo.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("commit_id: {head}")))
        .stdout(predicate::str::contains("branch: main"))
        .stdout(predicate::str::contains("nearest_tags: 3.1.4"))
        .stdout(predicate::str::contains("commits_since_nearest: 1"));
}

#[test]
fn git_version_json() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "3.1.4"]);

    let output = cmd()
        .args(["--json", "git-version", "-d", repo.path().to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["branch"], "main");
    assert_eq!(value["exact_tags"], serde_json::json!(["3.1.4"]));
    assert_eq!(value["commits_since_nearest"], 0);
}

#[test]
fn semver_json() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "1.2.3"]);

    let output = cmd()
        .args(["--json", "semver", "-d", repo.path().to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value, serde_json::json!({ "version": "1.2.3" }));
}

#[test]
fn directory_flag_uses_that_checkout_config() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["branch", "-m", "trunk"]);
    std::fs::write(
        repo.path().join(".git2version.toml"),
        "[resolve]\nrelease_branches = [\"trunk\"]\n",
    )
    .unwrap();
    let head = short_head(repo.path());
    let elsewhere = TempDir::new().unwrap();

    let inside = cmd()
        .args(["-C", repo.path().to_str().unwrap(), "semver"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let outside = cmd()
        .args(["-C", elsewhere.path().to_str().unwrap(), "semver"])
        .args(["-d", repo.path().to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(
        String::from_utf8(inside).unwrap(),
        format!("0.0.0-pre.0+g{head}\n")
    );
    assert_eq!(
        String::from_utf8(outside).unwrap(),
        format!("0.0.0-pre.0+g{head}\n")
    );

    cmd()
        .args(["-C", elsewhere.path().to_str().unwrap(), "docker-tag"])
        .args(["-d", repo.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("0.0.0-pre.0-g{head}\n")));
}

#[test]
fn chdir_is_used_as_default_directory() {
    require_git!();
    let repo = repo();
    git(repo.path(), &["tag", "5.0.0"]);

    cmd()
        .args(["-C", repo.path().to_str().unwrap(), "docker-tag"])
        .assert()
        .success()
        .stdout("5.0.0\n");
}
