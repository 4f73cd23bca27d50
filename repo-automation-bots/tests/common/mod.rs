//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use repo_automation_bots::events::BuildResultPayload;
use repo_automation_bots::release_please::{GitHubReleaseOptions, ReleasePrOptions};
use repo_automation_bots::{
    ConfigError, ConfigSource, GitHubError, IssueState, IssueTracker, LabelMapSource, NewIssue,
    ReleaseError, ReleasePrBuilder, RepoRef, TrackingIssue,
};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

pub const COMMIT: &str = "123";
pub const BUILD_URL: &str = "http://example.com";

/// Fixed clock for triage tests.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 3, 1, 12, 0, 0).unwrap()
}

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

/// Build result payload carrying `xml` as its report.
pub fn xunit_payload(repo: &str, xml: &str) -> BuildResultPayload {
    BuildResultPayload {
        repo: Some(repo.to_string()),
        commit: Some(COMMIT.to_string()),
        build_url: Some(BUILD_URL.to_string()),
        xunit_xml: Some(STANDARD.encode(xml)),
        ..BuildResultPayload::default()
    }
}

pub fn open_issue(number: u64, title: &str, labels: &[&str]) -> TrackingIssue {
    TrackingIssue {
        number,
        title: title.to_string(),
        body: String::new(),
        state: IssueState::Open,
        labels: labels.iter().map(|l| (*l).to_string()).collect(),
        created_at: now() - TimeDelta::days(30),
        closed_at: None,
        locked: false,
        is_pull_request: false,
    }
}

pub fn closed_issue(number: u64, title: &str, closed_ago: TimeDelta) -> TrackingIssue {
    TrackingIssue {
        state: IssueState::Closed,
        closed_at: Some(now() - closed_ago),
        ..open_issue(number, title, &["buildcop: issue"])
    }
}

/// Everything the fake tracker has seen.
#[derive(Debug, Default)]
pub struct TrackerState {
    pub issues: Vec<TrackingIssue>,
    pub created: Vec<NewIssue>,
    pub comments: Vec<(u64, String)>,
    pub state_changes: Vec<(u64, IssueState)>,
    pub added_labels: Vec<(u64, Vec<String>)>,
    pub removed_labels: Vec<(u64, String)>,
    pub repo_labels: Vec<String>,
    pub created_labels: Vec<(String, String)>,
    pub fail_list: bool,
    pub fail_comments_on: HashSet<u64>,
    pub fail_labels_on: HashSet<u64>,
}

impl TrackerState {
    /// Number of calls that changed something.
    pub fn writes(&self) -> usize {
        self.created.len()
            + self.comments.len()
            + self.state_changes.len()
            + self.added_labels.len()
            + self.removed_labels.len()
            + self.created_labels.len()
    }

    fn issue_mut(&mut self, number: u64) -> Result<&mut TrackingIssue, GitHubError> {
        self.issues
            .iter_mut()
            .find(|issue| issue.number == number)
            .ok_or_else(|| GitHubError::Request(format!("issue #{number} not found")))
    }
}

/// In-memory [`IssueTracker`] for a single repository.
#[derive(Debug, Default)]
pub struct FakeTracker {
    state: Mutex<TrackerState>,
}

impl FakeTracker {
    pub fn new(issues: Vec<TrackingIssue>) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                issues,
                ..TrackerState::default()
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap()
    }

    pub fn issue(&self, number: u64) -> TrackingIssue {
        self.state()
            .issues
            .iter()
            .find(|issue| issue.number == number)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn list_issues(
        &self,
        _repo: &RepoRef,
        label: Option<&str>,
    ) -> Result<Vec<TrackingIssue>, GitHubError> {
        let state = self.state();
        if state.fail_list {
            return Err(GitHubError::Request("list failed".to_string()));
        }
        Ok(state
            .issues
            .iter()
            .filter(|issue| label.is_none_or(|l| issue.has_label(l)))
            .cloned()
            .collect())
    }

    async fn create_issue(
        &self,
        _repo: &RepoRef,
        issue: &NewIssue,
    ) -> Result<TrackingIssue, GitHubError> {
        let mut state = self.state();
        let number = state.issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        let created = TrackingIssue {
            number,
            title: issue.title.clone(),
            body: issue.body.clone(),
            state: IssueState::Open,
            labels: issue.labels.clone(),
            created_at: now(),
            closed_at: None,
            locked: false,
            is_pull_request: false,
        };
        state.created.push(issue.clone());
        state.issues.push(created.clone());
        Ok(created)
    }

    async fn comment(&self, _repo: &RepoRef, number: u64, body: &str) -> Result<(), GitHubError> {
        let mut state = self.state();
        if state.fail_comments_on.contains(&number) {
            return Err(GitHubError::Request(format!("comment on #{number} failed")));
        }
        state.comments.push((number, body.to_string()));
        Ok(())
    }

    async fn set_state(
        &self,
        _repo: &RepoRef,
        number: u64,
        issue_state: IssueState,
    ) -> Result<(), GitHubError> {
        let mut state = self.state();
        let issue = state.issue_mut(number)?;
        issue.state = issue_state;
        issue.closed_at = (issue_state == IssueState::Closed).then(now);
        state.state_changes.push((number, issue_state));
        Ok(())
    }

    async fn add_labels(
        &self,
        _repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError> {
        let mut state = self.state();
        if state.fail_labels_on.contains(&number) {
            return Err(GitHubError::Request(format!("labeling #{number} failed")));
        }
        let issue = state.issue_mut(number)?;
        for label in labels {
            issue.add_label(label);
        }
        state.added_labels.push((number, labels.to_vec()));
        Ok(())
    }

    async fn remove_label(
        &self,
        _repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), GitHubError> {
        let mut state = self.state();
        if let Ok(issue) = state.issue_mut(number) {
            issue.labels.retain(|l| l != label);
        }
        state.removed_labels.push((number, label.to_string()));
        Ok(())
    }

    async fn list_issue_labels(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<String>, GitHubError> {
        let mut state = self.state();
        Ok(state.issue_mut(number)?.labels.clone())
    }

    async fn find_label(&self, _repo: &RepoRef, name: &str) -> Result<Option<String>, GitHubError> {
        Ok(self
            .state()
            .repo_labels
            .iter()
            .find(|label| label.as_str() == name)
            .cloned())
    }

    async fn create_label(
        &self,
        _repo: &RepoRef,
        name: &str,
        color: &str,
    ) -> Result<(), GitHubError> {
        let mut state = self.state();
        state.repo_labels.push(name.to_string());
        state
            .created_labels
            .push((name.to_string(), color.to_string()));
        Ok(())
    }
}

/// Per-repository config files keyed by `owner/name`.
#[derive(Debug, Default)]
pub struct FakeConfigSource {
    files: HashMap<String, String>,
}

impl FakeConfigSource {
    pub fn with(repo: &str, contents: &str) -> Self {
        Self {
            files: HashMap::from([(repo.to_string(), contents.to_string())]),
        }
    }
}

#[async_trait]
impl ConfigSource for FakeConfigSource {
    async fn fetch_config(
        &self,
        repo: &RepoRef,
        _file_name: &str,
    ) -> Result<Option<String>, GitHubError> {
        Ok(self.files.get(&repo.full_name()).cloned())
    }
}

/// Label map served from memory.
#[derive(Debug, Default)]
pub struct FakeLabelMapSource {
    contents: Option<String>,
}

impl FakeLabelMapSource {
    pub fn new(contents: &str) -> Self {
        Self {
            contents: Some(contents.to_string()),
        }
    }
}

#[async_trait]
impl LabelMapSource for FakeLabelMapSource {
    async fn load(&self, bucket: &str, object: &str) -> Result<String, ConfigError> {
        self.contents.clone().ok_or_else(|| ConfigError::MissingFile {
            path: format!("{bucket}/{object}"),
        })
    }
}

/// Records builder invocations.
#[derive(Debug, Default)]
pub struct FakeReleaseBuilder {
    pub release_prs: Mutex<Vec<ReleasePrOptions>>,
    pub github_releases: Mutex<Vec<GitHubReleaseOptions>>,
    pub fail: bool,
}

impl FakeReleaseBuilder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn release_prs(&self) -> Vec<ReleasePrOptions> {
        self.release_prs.lock().unwrap().clone()
    }

    pub fn github_releases(&self) -> Vec<GitHubReleaseOptions> {
        self.github_releases.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReleasePrBuilder for FakeReleaseBuilder {
    async fn build_release_pr(&self, options: &ReleasePrOptions) -> Result<(), ReleaseError> {
        if self.fail {
            return Err(ReleaseError::Builder("release PR failed".to_string()));
        }
        self.release_prs.lock().unwrap().push(options.clone());
        Ok(())
    }

    async fn create_github_release(
        &self,
        options: &GitHubReleaseOptions,
    ) -> Result<(), ReleaseError> {
        if self.fail {
            return Err(ReleaseError::Builder("GitHub release failed".to_string()));
        }
        self.github_releases.lock().unwrap().push(options.clone());
        Ok(())
    }
}
