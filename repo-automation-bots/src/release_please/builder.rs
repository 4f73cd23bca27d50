//! Release PR builder interface.
//!
//! Versioning and changelog generation happen outside this crate. The
//! handler only decides when to run the builder and with which options.

use super::{ReleaseError, ReleaseType};
use async_trait::async_trait;

/// API endpoint handed to the builder.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Label the builder looks for when turning a merged release PR into a
/// GitHub release.
pub const PENDING_RELEASE_LABEL: &str = "autorelease: pending";

/// Options for creating or updating the release PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePrOptions {
    pub release_type: ReleaseType,
    pub package_name: String,
    /// Repository full name, `owner/name`.
    pub repo_url: String,
    pub api_url: String,
    /// Comma-joined release labels, when configured.
    pub label: Option<String>,
    pub bump_minor_pre_major: bool,
}

/// Options for creating a GitHub release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubReleaseOptions {
    pub label: String,
    pub repo_url: String,
    pub package_name: String,
    pub api_url: String,
}

impl GitHubReleaseOptions {
    /// Options for `repo_url` with the default label and API URL.
    #[must_use]
    pub fn new(repo_url: &str, package_name: &str) -> Self {
        Self {
            label: PENDING_RELEASE_LABEL.to_string(),
            repo_url: repo_url.to_string(),
            package_name: package_name.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Creates release PRs and GitHub releases.
#[async_trait]
pub trait ReleasePrBuilder: Send + Sync {
    /// Creates or updates the evergreen release PR.
    async fn build_release_pr(&self, options: &ReleasePrOptions) -> Result<(), ReleaseError>;

    /// Turns a merged release PR into a GitHub release.
    async fn create_github_release(
        &self,
        options: &GitHubReleaseOptions,
    ) -> Result<(), ReleaseError>;
}
