//! Webhook payload types.
//!
//! Only the fields the bots read are modelled; everything else in GitHub's
//! payloads is ignored.

use crate::github::RepoRef;
use serde::Deserialize;

/// A user or organization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {
    pub login: String,
}

/// A label attached to an issue or pull request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Repository section of a GitHub payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: Account,
    /// Primary language detected by GitHub.
    #[serde(default)]
    pub language: Option<String>,
}

impl Repository {
    /// Owner and name of the repository.
    #[must_use]
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.owner.login, &self.name)
    }
}

/// Issue section of an `issues` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueDetails {
    pub number: u64,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Payload of `issues` deliveries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuePayload {
    pub issue: IssueDetails,
    pub repository: Repository,
}

/// Payload of `push` deliveries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: Repository,
}

impl PushPayload {
    /// Branch pushed to, without the `refs/heads/` prefix.
    #[must_use]
    pub fn branch(&self) -> &str {
        self.git_ref
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.git_ref)
    }
}

/// Payload of `release` deliveries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleasePayload {
    pub repository: Repository,
}

/// Pull request section of a `pull_request` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestDetails {
    pub number: u64,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Payload of `pull_request` deliveries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestPayload {
    pub pull_request: PullRequestDetails,
    pub repository: Repository,
}

/// Named section (`{"name": ...}`) of a build result payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Named {
    pub name: String,
}

/// Build result submitted by CI.
///
/// The repository is given either as `repo` (`owner/name`) or as
/// `organization.login` plus `repository.name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildResultPayload {
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub organization: Option<Account>,
    #[serde(default)]
    pub repository: Option<Named>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default, rename = "buildURL")]
    pub build_url: Option<String>,
    /// Base64-encoded xUnit XML report.
    #[serde(default, rename = "xunitXML")]
    pub xunit_xml: Option<String>,
    /// Whole-build result when no per-test report is available.
    #[serde(default, rename = "testsFailed")]
    pub tests_failed: Option<bool>,
}

impl BuildResultPayload {
    /// Repository the results belong to, if the payload names one.
    #[must_use]
    pub fn repo_ref(&self) -> Option<RepoRef> {
        if let Some(full_name) = &self.repo {
            return RepoRef::parse(full_name);
        }

        match (&self.organization, &self.repository) {
            (Some(org), Some(repo)) if !org.login.is_empty() && !repo.name.is_empty() => {
                Some(RepoRef::new(&org.login, &repo.name))
            }
            _ => None,
        }
    }
}
