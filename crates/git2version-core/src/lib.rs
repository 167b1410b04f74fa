//! Core library for git2version.
//!
//! Derives a semantic version and a container image tag from the state of
//! a git checkout.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`container`] - Container image tags
//! - [`error`] - Error types and result aliases
//! - [`git`] - Repository inspection via the `git` command line
//! - [`pipeline`] - Directory to version/tag in one call
//! - [`state`] - Normalized repository facts
//! - [`version`] - Semantic versions and the resolution rules
//!
//! # Quick Start
//!
//! ```
//! use git2version_core::{ContainerTag, RepositoryState, VersionResolver};
//!
//! let state = RepositoryState::new("abc1234", "feature/x", vec![], vec!["1.4.2".into()], 3);
//! let version = VersionResolver::default()
//!     .resolve(&state, &mut |diagnostic| eprintln!("{diagnostic}"))
//!     .unwrap();
//! assert_eq!(version.to_string(), "1.4.3-dev.3+gabc1234");
//!
//! let tag = ContainerTag::from_semantic_version(&version).unwrap();
//! assert_eq!(tag.to_string(), "1.4.3-dev.3-gabc1234");
//! ```
#![deny(unsafe_code)]

pub mod config;

pub mod container;

pub mod error;

pub mod git;

pub mod pipeline;

pub mod state;

pub mod version;

pub use config::{Config, ConfigLoader, LogLevel};

pub use container::{ContainerTag, TagError};

pub use error::{ConfigError, ConfigResult, Error, Result};

pub use state::RepositoryState;

pub use version::resolve::{Diagnostic, ResolveRules, VersionResolver};

pub use version::{SemanticVersion, VersionError};
