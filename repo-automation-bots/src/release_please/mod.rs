//! Release PR automation.
//!
//! Repositories opt in with `.github/release-please.yml`. Pushes to the
//! primary branch, published releases and the force-run label all ask the
//! [`ReleasePrBuilder`] to refresh the release PR.

mod builder;
mod config;
mod error;
mod release_type;

pub use builder::{
    GitHubReleaseOptions, ReleasePrBuilder, ReleasePrOptions, DEFAULT_API_URL,
    PENDING_RELEASE_LABEL,
};
pub use config::ReleasePleaseConfig;
pub use error::ReleaseError;
pub use release_type::ReleaseType;

use crate::error::BotError;
use crate::events::{PullRequestPayload, PushPayload, ReleasePayload, Repository};
use crate::github::{ConfigSource, IssueTracker};
use crate::summary::HandlerOutcome;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Per-repository configuration file name, under `.github/`.
pub const WELL_KNOWN_CONFIGURATION_FILE: &str = "release-please.yml";

/// Pull request label that forces a release PR refresh.
pub const FORCE_RUN_LABEL: &str = "release-please:force-run";

/// The release-please bot.
pub struct ReleasePlease {
    tracker: Arc<dyn IssueTracker>,
    configs: Arc<dyn ConfigSource>,
    builder: Arc<dyn ReleasePrBuilder>,
}

impl ReleasePlease {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        configs: Arc<dyn ConfigSource>,
        builder: Arc<dyn ReleasePrBuilder>,
    ) -> Self {
        Self {
            tracker,
            configs,
            builder,
        }
    }

    /// Handles `push`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError`] if the configuration cannot be read, the release
    /// type cannot be determined, or the builder fails.
    pub async fn handle_push(&self, payload: &PushPayload) -> Result<HandlerOutcome, BotError> {
        let repository = &payload.repository;
        let span = info_span!("release_please", repo = %repository.full_name, event = "push");

        async {
            let Some(config) = self.load_config(repository).await? else {
                return Ok(not_configured(repository));
            };

            let branch = payload.branch();
            if branch != config.primary_branch {
                info!(
                    primary_branch = %config.primary_branch,
                    branch,
                    "Not on primary branch"
                );
                return Ok(skipped(
                    repository,
                    format!("not on primary branch ({})", config.primary_branch),
                ));
            }

            let release_type = self.build_release_pr(repository, &config).await?;

            if config.handle_gh_release {
                info!("Handling GitHub release");
                let options = GitHubReleaseOptions::new(
                    &repository.full_name,
                    config.package_name_or(&repository.name),
                );
                self.builder.create_github_release(&options).await?;
            }

            Ok(HandlerOutcome::ReleaseTriggered {
                repository: repository.full_name.clone(),
                release_type: release_type.to_string(),
                github_release: config.handle_gh_release,
            })
        }
        .instrument(span)
        .await
    }

    /// Handles `release.published`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::handle_push`].
    pub async fn handle_release(&self, payload: &ReleasePayload) -> Result<HandlerOutcome, BotError> {
        let repository = &payload.repository;
        let span = info_span!("release_please", repo = %repository.full_name, event = "release.published");

        async {
            let Some(config) = self.load_config(repository).await? else {
                return Ok(not_configured(repository));
            };

            let release_type = self.build_release_pr(repository, &config).await?;
            Ok(HandlerOutcome::ReleaseTriggered {
                repository: repository.full_name.clone(),
                release_type: release_type.to_string(),
                github_release: false,
            })
        }
        .instrument(span)
        .await
    }

    /// Handles `pull_request.labeled`.
    ///
    /// The force-run label is removed before the configuration is checked,
    /// so it never lingers on the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`BotError`] if the label cannot be removed, or for any of the
    /// reasons [`Self::handle_push`] fails.
    pub async fn handle_labeled(
        &self,
        payload: &PullRequestPayload,
    ) -> Result<HandlerOutcome, BotError> {
        let repository = &payload.repository;
        let labels = &payload.pull_request.labels;

        if !labels.iter().any(|label| label.name == FORCE_RUN_LABEL) {
            let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
            info!(repo = %repository.full_name, labels = %names.join(", "), "Ignoring non-force label action");
            return Ok(skipped(repository, "not a force-run request".to_string()));
        }

        let number = payload.pull_request.number;
        let span = info_span!(
            "release_please",
            repo = %repository.full_name,
            event = "pull_request.labeled",
            pr_number = number
        );

        async {
            self.tracker
                .remove_label(&repository.repo_ref(), number, FORCE_RUN_LABEL)
                .await?;

            let Some(config) = self.load_config(repository).await? else {
                return Ok(not_configured(repository));
            };

            let release_type = self.build_release_pr(repository, &config).await?;
            Ok(HandlerOutcome::ReleaseTriggered {
                repository: repository.full_name.clone(),
                release_type: release_type.to_string(),
                github_release: false,
            })
        }
        .instrument(span)
        .await
    }

    async fn load_config(
        &self,
        repository: &Repository,
    ) -> Result<Option<ReleasePleaseConfig>, BotError> {
        let raw = self
            .configs
            .fetch_config(&repository.repo_ref(), WELL_KNOWN_CONFIGURATION_FILE)
            .await?;

        let config = match raw {
            Some(raw) => ReleasePleaseConfig::parse(&raw, WELL_KNOWN_CONFIGURATION_FILE)?,
            None => None,
        };
        if config.is_none() {
            info!("release-please not configured");
        }
        Ok(config)
    }

    async fn build_release_pr(
        &self,
        repository: &Repository,
        config: &ReleasePleaseConfig,
    ) -> Result<ReleaseType, BotError> {
        let release_type = match &config.release_type {
            Some(release_type) => release_type.clone(),
            None => ReleaseType::from_language(repository.language.as_deref())?,
        };

        let options = ReleasePrOptions {
            release_type: release_type.clone(),
            package_name: config.package_name_or(&repository.name).to_string(),
            repo_url: repository.full_name.clone(),
            api_url: DEFAULT_API_URL.to_string(),
            label: config.joined_labels(),
            bump_minor_pre_major: config.bump_minor_pre_major,
        };

        info!(release_type = %release_type, package = %options.package_name, "Building release PR");
        self.builder.build_release_pr(&options).await?;
        Ok(release_type)
    }
}

fn not_configured(repository: &Repository) -> HandlerOutcome {
    skipped(repository, "release-please not configured".to_string())
}

fn skipped(repository: &Repository, reason: String) -> HandlerOutcome {
    HandlerOutcome::Skipped {
        repository: repository.full_name.clone(),
        reason,
    }
}
