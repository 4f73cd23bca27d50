//! Live [`IssueTracker`] and [`ConfigSource`] backed by octocrab.

use super::rate_limit::ensure_core_rate_limit;
use super::{
    ConfigSource, GitHubError, IssueState, IssueTracker, NewIssue, RepoRef, TrackingIssue,
};
use async_trait::async_trait;
use octocrab::models::issues::Issue;
use octocrab::{models, params, Octocrab};
use tracing::{debug, info_span, Instrument};

/// Results per page for issue and label listings.
const RESULTS_PER_PAGE: u8 = 100;

/// GitHub client shared by all bots in a process.
#[derive(Clone)]
pub struct OctocrabClient {
    octocrab: Octocrab,
}

impl OctocrabClient {
    /// Builds a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] if the client cannot be constructed.
    pub fn new(token: impl Into<String>) -> Result<Self, GitHubError> {
        let octocrab = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self { octocrab })
    }

    /// Wraps an already configured octocrab instance (e.g. an app installation).
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }
}

fn to_tracking_issue(issue: Issue) -> TrackingIssue {
    TrackingIssue {
        number: issue.number,
        title: issue.title,
        body: issue.body.unwrap_or_default(),
        state: match issue.state {
            models::IssueState::Open => IssueState::Open,
            _ => IssueState::Closed,
        },
        labels: issue.labels.into_iter().map(|label| label.name).collect(),
        created_at: issue.created_at,
        closed_at: issue.closed_at,
        locked: issue.locked,
        is_pull_request: issue.pull_request.is_some(),
    }
}

/// Reports 403s on writes as [`GitHubError::PermissionDenied`].
fn write_error(repo: &RepoRef, error: octocrab::Error) -> GitHubError {
    let error = GitHubError::from(error);
    if error.is_permission_denied() {
        GitHubError::PermissionDenied {
            repo: repo.full_name(),
        }
    } else {
        error
    }
}

#[async_trait]
impl IssueTracker for OctocrabClient {
    async fn list_issues(
        &self,
        repo: &RepoRef,
        label: Option<&str>,
    ) -> Result<Vec<TrackingIssue>, GitHubError> {
        let span = info_span!("list_issues", repo = %repo, label = label.unwrap_or(""));

        async {
            let labels: Vec<String> = label.into_iter().map(str::to_string).collect();
            let handler = self.octocrab.issues(&repo.owner, &repo.name);
            let mut request = handler
                .list()
                .state(params::State::All)
                .per_page(RESULTS_PER_PAGE);
            if !labels.is_empty() {
                request = request.labels(&labels);
            }

            let first_page = request.send().await?;
            let issues = self.octocrab.all_pages(first_page).await?;

            debug!(count = issues.len(), "Listed issues");
            Ok(issues.into_iter().map(to_tracking_issue).collect())
        }
        .instrument(span)
        .await
    }

    async fn create_issue(
        &self,
        repo: &RepoRef,
        issue: &NewIssue,
    ) -> Result<TrackingIssue, GitHubError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        let created = self
            .octocrab
            .issues(&repo.owner, &repo.name)
            .create(&issue.title)
            .body(&issue.body)
            .labels(issue.labels.clone())
            .send()
            .await
            .map_err(|e| write_error(repo, e))?;

        Ok(to_tracking_issue(created))
    }

    async fn comment(&self, repo: &RepoRef, number: u64, body: &str) -> Result<(), GitHubError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .create_comment(number, body)
            .await
            .map_err(|e| write_error(repo, e))?;
        Ok(())
    }

    async fn set_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: IssueState,
    ) -> Result<(), GitHubError> {
        let state = match state {
            IssueState::Open => models::IssueState::Open,
            IssueState::Closed => models::IssueState::Closed,
        };

        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .update(number)
            .state(state)
            .send()
            .await
            .map_err(|e| write_error(repo, e))?;
        Ok(())
    }

    async fn add_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .add_labels(number, labels)
            .await
            .map_err(|e| write_error(repo, e))?;
        Ok(())
    }

    async fn remove_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), GitHubError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .remove_label(number, label)
            .await
            .map_err(|e| write_error(repo, e))?;
        Ok(())
    }

    async fn list_issue_labels(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<String>, GitHubError> {
        let first_page = self
            .octocrab
            .issues(&repo.owner, &repo.name)
            .list_labels_for_issue(number)
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await?;
        let labels = self.octocrab.all_pages(first_page).await?;

        Ok(labels.into_iter().map(|label| label.name).collect())
    }

    async fn find_label(&self, repo: &RepoRef, name: &str) -> Result<Option<String>, GitHubError> {
        match self
            .octocrab
            .issues(&repo.owner, &repo.name)
            .get_label(name)
            .await
        {
            Ok(label) => Ok(Some(label.name)),
            Err(e) => {
                let error = GitHubError::from(e);
                if error.is_not_found() {
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }

    async fn create_label(
        &self,
        repo: &RepoRef,
        name: &str,
        color: &str,
    ) -> Result<(), GitHubError> {
        ensure_core_rate_limit(&self.octocrab).await?;
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .create_label(name, color, "")
            .await
            .map_err(|e| write_error(repo, e))?;
        Ok(())
    }
}

#[async_trait]
impl ConfigSource for OctocrabClient {
    async fn fetch_config(
        &self,
        repo: &RepoRef,
        file_name: &str,
    ) -> Result<Option<String>, GitHubError> {
        let path = format!(".github/{file_name}");
        debug!(repo = %repo, path = %path, "Fetching repository config");

        match self
            .octocrab
            .repos(&repo.owner, &repo.name)
            .get_content()
            .path(&path)
            .send()
            .await
        {
            Ok(mut content) => Ok(content
                .take_items()
                .into_iter()
                .next()
                .and_then(|item| item.decoded_content())),
            Err(e) => {
                let error = GitHubError::from(e);
                if error.is_not_found() {
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }
}
