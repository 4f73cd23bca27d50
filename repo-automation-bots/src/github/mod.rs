//! GitHub capability interface.
//!
//! The bots never talk to octocrab directly. They receive an
//! [`IssueTracker`] (and, for release-please, a [`ConfigSource`]) so tests
//! can substitute in-memory fakes. [`OctocrabClient`] is the live
//! implementation of both.

mod client;
mod error;
mod issue;
mod rate_limit;
mod repository;

pub use client::OctocrabClient;
pub use error::GitHubError;
pub use issue::{IssueState, NewIssue, TrackingIssue};
pub use rate_limit::{check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, RateLimitInfo};
pub use repository::RepoRef;

use async_trait::async_trait;

/// Issue and label operations the bots are allowed to perform.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Lists every issue and pull request in the repository, open and
    /// closed, optionally restricted to those carrying `label`.
    async fn list_issues(
        &self,
        repo: &RepoRef,
        label: Option<&str>,
    ) -> Result<Vec<TrackingIssue>, GitHubError>;

    /// Creates an issue and returns it.
    async fn create_issue(
        &self,
        repo: &RepoRef,
        issue: &NewIssue,
    ) -> Result<TrackingIssue, GitHubError>;

    /// Adds a comment to an issue.
    async fn comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<(), GitHubError>;

    /// Opens or closes an issue.
    async fn set_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: IssueState,
    ) -> Result<(), GitHubError>;

    /// Adds labels to an issue, keeping existing ones.
    async fn add_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError>;

    /// Removes a single label from an issue.
    async fn remove_label(&self, repo: &RepoRef, number: u64, label: &str)
        -> Result<(), GitHubError>;

    /// Lists label names on an issue.
    async fn list_issue_labels(&self, repo: &RepoRef, number: u64)
        -> Result<Vec<String>, GitHubError>;

    /// Looks up a repository label by name.
    async fn find_label(&self, repo: &RepoRef, name: &str) -> Result<Option<String>, GitHubError>;

    /// Creates a repository label.
    async fn create_label(&self, repo: &RepoRef, name: &str, color: &str)
        -> Result<(), GitHubError>;
}

/// Access to per-repository configuration files.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetches `.github/<file_name>` from the repository's default branch.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    async fn fetch_config(
        &self,
        repo: &RepoRef,
        file_name: &str,
    ) -> Result<Option<String>, GitHubError>;
}
