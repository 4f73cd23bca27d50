//! Crate-wide error type.

use crate::buildcop::ParseError;
use crate::config::ConfigError;
use crate::github::GitHubError;
use crate::release_please::ReleaseError;
use thiserror::Error;

/// Any error a bot handler can hit.
///
/// The dispatcher turns these into a failed outcome; none of them is fatal
/// to the host process.
#[derive(Debug, Error)]
pub enum BotError {
    /// A test report could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A GitHub API call failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The release PR builder failed.
    #[error(transparent)]
    Release(#[from] ReleaseError),
}
