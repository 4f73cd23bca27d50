//! Release PR error types.

use thiserror::Error;

/// Errors that can occur while triggering a release.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// No release type configured and GitHub detected no language.
    #[error("repository has no detected language")]
    NoLanguage,

    /// The repository language has no release strategy.
    #[error("unknown release type: {0}")]
    UnknownLanguage(String),

    /// The release PR builder reported a failure.
    #[error("Release builder failed: {0}")]
    Builder(String),
}
