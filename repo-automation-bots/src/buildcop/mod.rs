//! Build failure triage.
//!
//! A build result is parsed into per-test results, grouped by test identity,
//! matched against the repository's tracking issues, and turned into issue
//! actions. Identities are processed one at a time and each action is awaited
//! before the next identity is resolved, so a pass never races itself into
//! duplicate issues.

mod error;
mod executor;
mod identity;
mod report;
mod resolver;
mod result;
mod triage;

pub use error::ParseError;
pub use executor::ActionExecutor;
pub use identity::{normalize, TestIdentity, EVERYTHING_FAILED_TITLE};
pub use report::{parse_payload, parse_xunit, PackageNaming};
pub use resolver::{ClosedStanding, FlakyWindow, IssueLedger, Resolution};
pub use result::{BuildInfo, Outcome, TestResult};
pub use triage::{group_results, Action, SkipReason, TestGroup, TestStatus, TriageEngine};

use crate::config::BuildCopSettings;
use crate::events::BuildResultPayload;
use crate::github::{IssueTracker, RepoRef, TrackingIssue};
use crate::summary::TriageSummary;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

/// Label carried by every issue this bot manages.
pub const ISSUE_LABEL: &str = "buildcop: issue";

/// Label marking an issue as flaky.
pub const FLAKY_LABEL: &str = "buildcop: flaky";

/// Label that stops failure comments.
pub const QUIET_LABEL: &str = "buildcop: quiet";

/// Labels applied to newly opened issues.
#[must_use]
pub fn new_issue_labels() -> Vec<String> {
    ["type: bug", "priority: p1", ISSUE_LABEL]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The build failure triage bot.
pub struct BuildCop {
    tracker: Arc<dyn IssueTracker>,
    engine: TriageEngine,
    naming: PackageNaming,
}

impl BuildCop {
    /// Creates the bot from settings.
    pub fn new(tracker: Arc<dyn IssueTracker>, settings: &BuildCopSettings) -> Self {
        Self {
            tracker,
            engine: TriageEngine::new(
                settings.doc_url.clone(),
                FlakyWindow::from_days(settings.flaky_window_days),
            ),
            naming: PackageNaming::new(settings.package_prefixes.clone()),
        }
    }

    /// Handles one build result submission.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the payload names no repository or carries
    /// a malformed report; no issue is touched in that case. API failures
    /// are logged and counted in the summary instead.
    pub async fn handle(
        &self,
        payload: &BuildResultPayload,
        now: DateTime<Utc>,
    ) -> Result<(RepoRef, TriageSummary), ParseError> {
        let repo = payload.repo_ref().ok_or(ParseError::MissingRepository)?;
        let span = info_span!("buildcop", repo = %repo, commit = payload.commit.as_deref().unwrap_or(""));

        async {
            let results = parse_payload(payload, &self.naming)?;
            info!(results = results.len(), "Parsed build report");

            let issues = self.list_issues(&repo).await;
            let summary = self.triage(&repo, &results, issues, now).await;
            Ok((repo.clone(), summary))
        }
        .instrument(span)
        .await
    }

    /// Lists tracking issues, falling back to none on failure so that every
    /// failing test still gets an issue.
    async fn list_issues(&self, repo: &RepoRef) -> Vec<TrackingIssue> {
        match self.tracker.list_issues(repo, Some(ISSUE_LABEL)).await {
            Ok(issues) => issues,
            Err(e) => {
                warn!(error = %e, "Failed to list issues, treating as none found");
                Vec::new()
            }
        }
    }

    /// Triages parsed results against a snapshot of the repository's issues.
    pub async fn triage(
        &self,
        repo: &RepoRef,
        results: &[TestResult],
        issues: Vec<TrackingIssue>,
        now: DateTime<Utc>,
    ) -> TriageSummary {
        let mut summary = TriageSummary::new();
        let mut ledger = IssueLedger::new(issues);
        let executor = ActionExecutor::new(self.tracker.as_ref(), repo);

        for group in group_results(results) {
            let title = group.identity.title();
            let resolution = ledger.resolve(&group.identity, self.engine.window(), now);

            let actions = match self.engine.decide(&group, &resolution) {
                Ok(actions) => actions,
                Err(e) => {
                    error!(title = %title, error = %e, "Failed to render triage message");
                    summary.record_failure();
                    continue;
                }
            };

            for action in &actions {
                match executor.apply(action, &mut ledger, now).await {
                    Ok(()) => summary.record(action),
                    Err(e) => {
                        error!(title = %title, error = %e, "Failed to apply triage action");
                        summary.record_failure();
                    }
                }
            }
        }

        info!(
            opened = summary.opened,
            commented = summary.commented,
            closed = summary.closed,
            reopened = summary.reopened,
            marked_flaky = summary.marked_flaky,
            duplicates_closed = summary.duplicates_closed,
            failed = summary.failed,
            "Triage complete"
        );
        summary
    }
}
