//! Triage summary types.

use crate::buildcop::Action;
use serde::Serialize;

/// Counts of actions taken during one triage pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TriageSummary {
    /// Number of issues opened.
    pub opened: usize,

    /// Number of failure comments posted.
    pub commented: usize,

    /// Number of issues closed for passing tests.
    pub closed: usize,

    /// Number of issues reopened as flaky.
    pub reopened: usize,

    /// Number of open issues marked flaky.
    pub marked_flaky: usize,

    /// Number of duplicate issues closed.
    pub duplicates_closed: usize,

    /// Number of results that needed no action.
    pub skipped: usize,

    /// Number of actions that failed.
    pub failed: usize,
}

impl TriageSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully applied action.
    pub fn record(&mut self, action: &Action) {
        match action {
            Action::OpenIssue { .. } => self.opened += 1,
            Action::CommentOnIssue { .. } => self.commented += 1,
            Action::CloseIssue { .. } => self.closed += 1,
            Action::ReopenIssue { .. } => self.reopened += 1,
            Action::MarkFlaky { .. } => self.marked_flaky += 1,
            Action::CloseDuplicate { .. } => self.duplicates_closed += 1,
            Action::Skip { .. } => self.skipped += 1,
        }
    }

    /// Records a failed action.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of actions that changed something on GitHub.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.opened
            + self.commented
            + self.closed
            + self.reopened
            + self.marked_flaky
            + self.duplicates_closed
    }

    /// Returns true if any action failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
