//! Automatic issue labeling.
//!
//! Each mapped repository has one label (usually an `api: ...` label) that
//! every issue should carry. New and reopened issues get it on arrival, and
//! adding `auto-label:backfill` to any issue labels the whole repository.

mod label_map;

pub use label_map::{FileLabelMapSource, LabelMap, LabelMapSource};

use crate::config::AutoLabelSettings;
use crate::error::BotError;
use crate::events::IssuePayload;
use crate::github::{IssueTracker, RepoRef};
use crate::summary::HandlerOutcome;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Label that triggers a repository-wide backfill.
pub const BACKFILL_LABEL: &str = "auto-label:backfill";

/// Color used when the mapped label has to be created.
pub const DEFAULT_LABEL_COLOR: &str = "ededed";

/// The auto-label bot.
pub struct AutoLabel {
    tracker: Arc<dyn IssueTracker>,
    label_maps: Arc<dyn LabelMapSource>,
    settings: AutoLabelSettings,
}

impl AutoLabel {
    /// Creates the bot.
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        label_maps: Arc<dyn LabelMapSource>,
        settings: AutoLabelSettings,
    ) -> Self {
        Self {
            tracker,
            label_maps,
            settings,
        }
    }

    /// Handles `issues.opened` and `issues.reopened`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError`] if the label map cannot be loaded or the label
    /// cannot be added.
    pub async fn handle_issue(&self, payload: &IssuePayload) -> Result<HandlerOutcome, BotError> {
        let repo = payload.repository.repo_ref();
        let number = payload.issue.number;
        let span = info_span!("auto_label", repo = %repo, issue_number = number);

        async {
            let map = self.load_map().await?;
            let Some(label) = map.lookup(&repo) else {
                info!("There was no match for the repo name");
                return Ok(skipped(&repo, "repository is not in the label map"));
            };

            self.ensure_repo_label(&repo, label).await;

            let existing = match self.tracker.list_issue_labels(&repo, number).await {
                Ok(labels) => labels,
                Err(e) => {
                    warn!(error = %e, "Failed to list issue labels, adding label anyway");
                    Vec::new()
                }
            };
            if existing.iter().any(|l| l == label) {
                info!(label, "This label already exists on this issue");
                return Ok(skipped(&repo, "label already on issue"));
            }

            self.tracker
                .add_labels(&repo, number, &[label.to_string()])
                .await?;
            info!(label, "Labeled issue");

            Ok(HandlerOutcome::Labeled {
                repository: repo.full_name(),
                issues_labeled: 1,
            })
        }
        .instrument(span)
        .await
    }

    /// Handles `issues.labeled`, backfilling the repository when the backfill
    /// label is present.
    ///
    /// # Errors
    ///
    /// Returns [`BotError`] if the label map or issue list cannot be loaded,
    /// or the backfill label cannot be removed. Individual label failures are
    /// logged and skipped.
    pub async fn handle_labeled(&self, payload: &IssuePayload) -> Result<HandlerOutcome, BotError> {
        let repo = payload.repository.repo_ref();

        if !payload
            .issue
            .labels
            .iter()
            .any(|label| label.name == BACKFILL_LABEL)
        {
            let labels: Vec<&str> = payload.issue.labels.iter().map(|l| l.name.as_str()).collect();
            info!(repo = %repo, labels = %labels.join(", "), "Ignoring non-backfill label action");
            return Ok(skipped(&repo, "not a backfill request"));
        }

        let span = info_span!("auto_label_backfill", repo = %repo);

        async {
            let map = self.load_map().await?;
            let Some(label) = map.lookup(&repo) else {
                info!("There was no match for the repo name");
                return Ok(skipped(&repo, "repository is not in the label map"));
            };

            let issues = self.tracker.list_issues(&repo, None).await?;
            let targets: Vec<u64> = issues
                .iter()
                .filter(|issue| issue.is_open() && !issue.is_pull_request)
                .map(|issue| issue.number)
                .collect();
            info!(count = targets.len(), label, "Backfilling label");

            let labels = [label.to_string()];
            let results: Vec<_> = stream::iter(targets)
                .map(|number| {
                    let tracker = Arc::clone(&self.tracker);
                    let repo = &repo;
                    let labels = &labels;
                    async move { (number, tracker.add_labels(repo, number, labels).await) }
                })
                .buffer_unordered(self.settings.concurrency.max(1))
                .collect()
                .await;

            let mut labeled = 0;
            for (number, result) in results {
                match result {
                    Ok(()) => labeled += 1,
                    Err(e) => warn!(issue_number = number, error = %e, "Failed to label issue"),
                }
            }

            self.tracker
                .remove_label(&repo, payload.issue.number, BACKFILL_LABEL)
                .await?;

            Ok(HandlerOutcome::Labeled {
                repository: repo.full_name(),
                issues_labeled: labeled,
            })
        }
        .instrument(span)
        .await
    }

    async fn load_map(&self) -> Result<LabelMap, BotError> {
        let raw = self
            .label_maps
            .load(&self.settings.bucket, &self.settings.object)
            .await?;
        Ok(LabelMap::from_json(&raw, &self.settings.object)?)
    }

    /// Creates the label in the repository if it does not exist yet.
    ///
    /// Failures are logged only; adding the label to the issue will create
    /// it implicitly.
    async fn ensure_repo_label(&self, repo: &RepoRef, label: &str) {
        match self.tracker.find_label(repo, label).await {
            Ok(Some(_)) => {
                info!(label, "Label already exists on the repository");
            }
            Ok(None) => {
                if let Err(e) = self
                    .tracker
                    .create_label(repo, label, DEFAULT_LABEL_COLOR)
                    .await
                {
                    warn!(label, error = %e, "Failed to create label");
                }
            }
            Err(e) => warn!(label, error = %e, "Failed to look up label"),
        }
    }
}

fn skipped(repo: &RepoRef, reason: &str) -> HandlerOutcome {
    HandlerOutcome::Skipped {
        repository: repo.full_name(),
        reason: reason.to_string(),
    }
}
