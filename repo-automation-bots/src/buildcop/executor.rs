//! Applying triage actions through the issue tracker.

use super::resolver::IssueLedger;
use super::triage::Action;
use crate::github::{GitHubError, IssueState, IssueTracker, NewIssue, RepoRef};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Applies [`Action`]s to one repository.
pub struct ActionExecutor<'a> {
    tracker: &'a dyn IssueTracker,
    repo: &'a RepoRef,
}

impl<'a> ActionExecutor<'a> {
    /// Creates an executor for `repo`.
    pub fn new(tracker: &'a dyn IssueTracker, repo: &'a RepoRef) -> Self {
        Self { tracker, repo }
    }

    /// Applies a single action and records its effect in `ledger`.
    ///
    /// Multi-call actions stop at the first failing call; whatever already
    /// went through stays applied.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] from the first failing API call.
    pub async fn apply(
        &self,
        action: &Action,
        ledger: &mut IssueLedger,
        now: DateTime<Utc>,
    ) -> Result<(), GitHubError> {
        match action {
            Action::OpenIssue {
                title,
                body,
                labels,
            } => {
                let issue = self
                    .tracker
                    .create_issue(
                        self.repo,
                        &NewIssue {
                            title: title.clone(),
                            body: body.clone(),
                            labels: labels.clone(),
                        },
                    )
                    .await?;
                info!(issue_number = issue.number, title = %title, "Opened issue");
                ledger.record_created(issue);
            }
            Action::CommentOnIssue { number, body } => {
                self.tracker.comment(self.repo, *number, body).await?;
                info!(issue_number = number, "Commented on issue");
            }
            Action::CloseIssue { number, body } => {
                self.tracker.comment(self.repo, *number, body).await?;
                self.close(*number, ledger, now).await?;
                info!(issue_number = number, "Closed issue for passing test");
            }
            Action::ReopenIssue {
                number,
                body,
                labels,
            } => {
                self.tracker
                    .set_state(self.repo, *number, IssueState::Open)
                    .await?;
                ledger.record_state(*number, IssueState::Open, now);
                self.tracker.add_labels(self.repo, *number, labels).await?;
                ledger.record_labels(*number, labels);
                self.tracker.comment(self.repo, *number, body).await?;
                info!(issue_number = number, "Reopened flaky issue");
            }
            Action::MarkFlaky {
                number,
                body,
                labels,
            } => {
                self.tracker.add_labels(self.repo, *number, labels).await?;
                ledger.record_labels(*number, labels);
                self.tracker.comment(self.repo, *number, body).await?;
                info!(issue_number = number, "Marked issue flaky");
            }
            Action::CloseDuplicate {
                number,
                canonical,
                body,
            } => {
                self.tracker.comment(self.repo, *number, body).await?;
                self.close(*number, ledger, now).await?;
                info!(issue_number = number, canonical, "Closed duplicate issue");
            }
            Action::Skip { number, reason } => {
                debug!(issue_number = ?number, reason = ?reason, "Nothing to do");
            }
        }

        Ok(())
    }

    async fn close(
        &self,
        number: u64,
        ledger: &mut IssueLedger,
        now: DateTime<Utc>,
    ) -> Result<(), GitHubError> {
        self.tracker
            .set_state(self.repo, number, IssueState::Closed)
            .await?;
        ledger.record_state(number, IssueState::Closed, now);
        Ok(())
    }
}
