//! Issue projections exchanged with the GitHub capability interface.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// A GitHub issue as seen during a single triage pass.
///
/// GitHub owns the authoritative state; this is only a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingIssue {
    /// Issue number.
    pub number: u64,

    /// Issue title.
    pub title: String,

    /// Issue body (empty when unset).
    pub body: String,

    /// Current state.
    pub state: IssueState,

    /// Label names.
    pub labels: Vec<String>,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// When the issue was last closed.
    pub closed_at: Option<DateTime<Utc>>,

    /// Whether the conversation is locked.
    pub locked: bool,

    /// Whether the item is a pull request rather than an issue.
    pub is_pull_request: bool,
}

impl TrackingIssue {
    /// Returns true if the issue is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    /// Returns true if the issue carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Adds `label` unless already present.
    pub fn add_label(&mut self, label: &str) {
        if !self.has_label(label) {
            self.labels.push(label.to_string());
        }
    }
}

/// Fields for a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}
