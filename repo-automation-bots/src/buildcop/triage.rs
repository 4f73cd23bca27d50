//! Deciding what to do with each test outcome.
//!
//! Decisions are pure: given a grouped result and its [`Resolution`], the
//! engine returns the actions to apply. Nothing is remembered between
//! deliveries; GitHub's issue state is re-read every time.

use super::identity::TestIdentity;
use super::resolver::{ClosedStanding, FlakyWindow, Resolution};
use super::result::{BuildInfo, Outcome, TestResult};
use super::{new_issue_labels, FLAKY_LABEL, QUIET_LABEL};
use crate::github::TrackingIssue;
use crate::templates::{IssueNote, TemplateError, TemplateRenderer};
use serde::Serialize;
use std::collections::HashMap;

/// Combined outcome of one identity within one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Only failures were reported.
    Failed,

    /// Only passes were reported.
    Passed,

    /// The same build reported both a pass and a failure.
    Mixed,
}

/// All results for one identity in one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    pub identity: TestIdentity,
    pub status: TestStatus,
    pub build: BuildInfo,
    pub failure_message: Option<String>,
}

/// Groups results by identity key, preserving first-seen order.
#[must_use]
pub fn group_results(results: &[TestResult]) -> Vec<TestGroup> {
    let mut groups: Vec<TestGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in results {
        let status = match result.outcome {
            Outcome::Passed => TestStatus::Passed,
            Outcome::Failed => TestStatus::Failed,
        };

        match index.get(&result.identity.key()) {
            Some(&i) => {
                let group = &mut groups[i];
                if group.status != status {
                    group.status = TestStatus::Mixed;
                }
                if group.failure_message.is_none() {
                    group.failure_message.clone_from(&result.failure_message);
                }
            }
            None => {
                index.insert(result.identity.key(), groups.len());
                groups.push(TestGroup {
                    identity: result.identity.clone(),
                    status,
                    build: result.build.clone(),
                    failure_message: result.failure_message.clone(),
                });
            }
        }
    }

    groups
}

/// Why nothing is done for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Passing test without an open issue.
    NothingToClose,

    /// The issue carries the quiet label.
    Quiet,

    /// The issue is already marked flaky.
    AlreadyFlaky,

    /// The issue is locked.
    Locked,
}

/// A single change to apply to the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Open a new tracking issue.
    OpenIssue {
        title: String,
        body: String,
        labels: Vec<String>,
    },

    /// Report another failure on an open issue.
    CommentOnIssue { number: u64, body: String },

    /// Comment, then close an issue whose test passed.
    CloseIssue { number: u64, body: String },

    /// Reopen a recently closed issue, adding `labels`, then comment.
    ReopenIssue {
        number: u64,
        body: String,
        labels: Vec<String>,
    },

    /// Add `labels` to an open issue and comment, leaving it open.
    MarkFlaky {
        number: u64,
        body: String,
        labels: Vec<String>,
    },

    /// Comment on and close a duplicate of `canonical`.
    CloseDuplicate {
        number: u64,
        canonical: u64,
        body: String,
    },

    /// Do nothing.
    Skip {
        number: Option<u64>,
        reason: SkipReason,
    },
}

/// The triage decision engine.
pub struct TriageEngine {
    renderer: TemplateRenderer,
    doc_url: String,
    window: FlakyWindow,
}

impl TriageEngine {
    /// Creates an engine rendering `doc_url` into new issues.
    pub fn new(doc_url: impl Into<String>, window: FlakyWindow) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            doc_url: doc_url.into(),
            window,
        }
    }

    /// Flaky window used for closed issues.
    #[must_use]
    pub fn window(&self) -> FlakyWindow {
        self.window
    }

    /// Decides the actions for one identity.
    ///
    /// Duplicate closures come first, followed by the action for the
    /// canonical issue.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if a message fails to render.
    pub fn decide(
        &self,
        group: &TestGroup,
        resolution: &Resolution,
    ) -> Result<Vec<Action>, TemplateError> {
        match resolution {
            Resolution::NoIssue => match group.status {
                TestStatus::Passed => Ok(vec![Action::Skip {
                    number: None,
                    reason: SkipReason::NothingToClose,
                }]),
                TestStatus::Failed | TestStatus::Mixed => Ok(vec![self.open_issue(group, None)?]),
            },
            Resolution::Open { issue, duplicates } => {
                let mut actions = Vec::with_capacity(duplicates.len() + 1);
                for duplicate in duplicates {
                    actions.push(Action::CloseDuplicate {
                        number: duplicate.number,
                        canonical: issue.number,
                        body: self.renderer.render_duplicate(issue.number)?,
                    });
                }
                actions.push(self.decide_open(group, issue)?);
                Ok(actions)
            }
            Resolution::Closed { issue, standing } => {
                if group.status == TestStatus::Passed {
                    return Ok(vec![Action::Skip {
                        number: Some(issue.number),
                        reason: SkipReason::NothingToClose,
                    }]);
                }

                let action = match standing {
                    ClosedStanding::InWindow => Action::ReopenIssue {
                        number: issue.number,
                        body: self
                            .renderer
                            .render_flaky_again(&group.build.status(false))?,
                        labels: vec![FLAKY_LABEL.to_string()],
                    },
                    ClosedStanding::Locked => self.open_issue(
                        group,
                        Some(IssueNote::Locked {
                            number: issue.number,
                        }),
                    )?,
                    ClosedStanding::Stale => self.open_issue(
                        group,
                        Some(IssueNote::Stale {
                            number: issue.number,
                            window_days: self.window.days(),
                        }),
                    )?,
                };
                Ok(vec![action])
            }
        }
    }

    fn decide_open(&self, group: &TestGroup, issue: &TrackingIssue) -> Result<Action, TemplateError> {
        let skip = |reason| Action::Skip {
            number: Some(issue.number),
            reason,
        };

        // Locked issues cannot be commented on or closed with a comment.
        if issue.locked {
            return match group.status {
                TestStatus::Passed => Ok(skip(SkipReason::Locked)),
                TestStatus::Failed | TestStatus::Mixed => self.open_issue(
                    group,
                    Some(IssueNote::Locked {
                        number: issue.number,
                    }),
                ),
            };
        }

        let flaky = issue.has_label(FLAKY_LABEL);
        match group.status {
            TestStatus::Failed if flaky => Ok(skip(SkipReason::AlreadyFlaky)),
            TestStatus::Failed if issue.has_label(QUIET_LABEL) => Ok(skip(SkipReason::Quiet)),
            TestStatus::Failed => Ok(Action::CommentOnIssue {
                number: issue.number,
                body: self.renderer.render_build_status(&group.build.status(false))?,
            }),
            // Flaky issues are left for a human to close.
            TestStatus::Passed if flaky => Ok(skip(SkipReason::AlreadyFlaky)),
            TestStatus::Passed => Ok(Action::CloseIssue {
                number: issue.number,
                body: self.renderer.render_passed(&group.build.status(true))?,
            }),
            TestStatus::Mixed if flaky => Ok(skip(SkipReason::AlreadyFlaky)),
            TestStatus::Mixed => Ok(Action::MarkFlaky {
                number: issue.number,
                body: self.renderer.render_flaky(&group.build.status(true))?,
                labels: vec![FLAKY_LABEL.to_string()],
            }),
        }
    }

    fn open_issue(&self, group: &TestGroup, note: Option<IssueNote>) -> Result<Action, TemplateError> {
        let status = group.build.status(false);
        let body = match note {
            Some(note) => self.renderer.render_note(note, &status)?,
            None => self.renderer.render_new_issue(&self.doc_url, &status)?,
        };

        Ok(Action::OpenIssue {
            title: group.identity.title(),
            body,
            labels: new_issue_labels(),
        })
    }
}
