//! Error types for git2version-core

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::container::TagError;
use crate::git::GitError;
use crate::version::VersionError;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(Utf8PathBuf),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Any failure while turning a checkout into a version or tag.
#[derive(Error, Debug)]
pub enum Error {
    /// Inspecting the repository failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A tag is not a valid semantic version.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// The version cannot be expressed as a container tag.
    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
