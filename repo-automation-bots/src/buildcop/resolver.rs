//! Matching test identities to existing tracking issues.

use super::identity::TestIdentity;
use crate::github::{IssueState, TrackingIssue};
use chrono::{DateTime, TimeDelta, Utc};
use std::cmp::Reverse;

/// How long after closing an issue a new failure still counts as flaky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlakyWindow {
    days: u32,
}

impl Default for FlakyWindow {
    fn default() -> Self {
        Self::from_days(10)
    }
}

impl FlakyWindow {
    /// Window of `days` days.
    #[must_use]
    pub fn from_days(days: u32) -> Self {
        Self { days }
    }

    /// Window length in days.
    #[must_use]
    pub fn days(&self) -> u32 {
        self.days
    }

    /// Returns true if an issue closed at `closed_at` is still inside the
    /// window at `now`. The boundary itself is inside.
    #[must_use]
    pub fn contains(&self, closed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - closed_at <= TimeDelta::days(i64::from(self.days))
    }
}

/// Why a closed candidate can or cannot be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedStanding {
    /// Closed recently enough to reopen as flaky.
    InWindow,

    /// Closed outside the flaky window (or with no close date).
    Stale,

    /// Locked, so it cannot be reopened or commented on.
    Locked,
}

/// Best matching issue for an identity.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Nothing matches.
    NoIssue,

    /// At least one open issue matches. `issue` is the canonical one and
    /// `duplicates` are the other open matches.
    Open {
        issue: TrackingIssue,
        duplicates: Vec<TrackingIssue>,
    },

    /// Only closed issues match; `issue` is the most recently closed.
    Closed {
        issue: TrackingIssue,
        standing: ClosedStanding,
    },
}

/// Snapshot of a repository's tracking issues for one triage pass.
///
/// Writes made during the pass are recorded here so later resolutions see
/// them.
#[derive(Debug, Clone, Default)]
pub struct IssueLedger {
    issues: Vec<TrackingIssue>,
}

impl IssueLedger {
    /// Builds a ledger, ignoring pull requests.
    #[must_use]
    pub fn new(issues: Vec<TrackingIssue>) -> Self {
        Self {
            issues: issues.into_iter().filter(|i| !i.is_pull_request).collect(),
        }
    }

    /// Issues currently known.
    #[must_use]
    pub fn issues(&self) -> &[TrackingIssue] {
        &self.issues
    }

    /// Finds the issue that should track `identity`.
    ///
    /// Among open matches the highest unlocked number (most recently
    /// created) is canonical; a locked issue is canonical only when every
    /// open match is locked. Without open matches, the most recently closed match is
    /// considered, ties going to the highest number.
    #[must_use]
    pub fn resolve(
        &self,
        identity: &TestIdentity,
        window: FlakyWindow,
        now: DateTime<Utc>,
    ) -> Resolution {
        let (mut open, mut closed): (Vec<&TrackingIssue>, Vec<&TrackingIssue>) = self
            .issues
            .iter()
            .filter(|issue| identity.matches_title(&issue.title))
            .partition(|issue| issue.is_open());

        if !open.is_empty() {
            // Unlocked issues first, newest first. Locked issues cannot take a
            // duplicate comment, so they are never closed as duplicates.
            open.sort_by_key(|issue| (issue.locked, Reverse(issue.number)));
            let issue = open[0].clone();
            let duplicates = open[1..]
                .iter()
                .filter(|i| !i.locked)
                .map(|&i| i.clone())
                .collect();
            return Resolution::Open { issue, duplicates };
        }

        closed.sort_by_key(|issue| Reverse((issue.closed_at, issue.number)));
        let Some(&issue) = closed.first() else {
            return Resolution::NoIssue;
        };

        let standing = if issue.locked {
            ClosedStanding::Locked
        } else if issue
            .closed_at
            .is_some_and(|closed_at| window.contains(closed_at, now))
        {
            ClosedStanding::InWindow
        } else {
            ClosedStanding::Stale
        };

        Resolution::Closed {
            issue: issue.clone(),
            standing,
        }
    }

    /// Records a newly created issue.
    pub fn record_created(&mut self, issue: TrackingIssue) {
        self.issues.push(issue);
    }

    /// Records a state change.
    pub fn record_state(&mut self, number: u64, state: IssueState, now: DateTime<Utc>) {
        if let Some(issue) = self.issues.iter_mut().find(|i| i.number == number) {
            issue.state = state;
            if state == IssueState::Closed {
                issue.closed_at = Some(now);
            }
        }
    }

    /// Records added labels.
    pub fn record_labels(&mut self, number: u64, labels: &[String]) {
        if let Some(issue) = self.issues.iter_mut().find(|i| i.number == number) {
            for label in labels {
                issue.add_label(label);
            }
        }
    }
}
