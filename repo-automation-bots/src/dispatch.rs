//! Routes decoded deliveries to the bot that handles them.

use crate::auto_label::{AutoLabel, LabelMapSource};
use crate::buildcop::BuildCop;
use crate::config::BotSettings;
use crate::error::BotError;
use crate::events::{EventError, WebhookEvent};
use crate::github::{ConfigSource, IssueTracker};
use crate::release_please::{ReleasePlease, ReleasePrBuilder};
use crate::summary::HandlerOutcome;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// External services the bots depend on.
#[derive(Clone)]
pub struct Collaborators {
    pub tracker: Arc<dyn IssueTracker>,
    pub config_source: Arc<dyn ConfigSource>,
    pub label_maps: Arc<dyn LabelMapSource>,
    pub release_builder: Arc<dyn ReleasePrBuilder>,
}

/// Holds one instance of each bot.
pub struct Dispatcher {
    buildcop: BuildCop,
    auto_label: AutoLabel,
    release_please: ReleasePlease,
}

impl Dispatcher {
    pub fn new(settings: &BotSettings, collaborators: Collaborators) -> Self {
        let Collaborators {
            tracker,
            config_source,
            label_maps,
            release_builder,
        } = collaborators;

        Self {
            buildcop: BuildCop::new(Arc::clone(&tracker), &settings.buildcop),
            auto_label: AutoLabel::new(
                Arc::clone(&tracker),
                label_maps,
                settings.auto_label.clone(),
            ),
            release_please: ReleasePlease::new(tracker, config_source, release_builder),
        }
    }

    /// Decodes and handles a raw delivery.
    ///
    /// Events no bot handles are skipped; undecodable payloads fail.
    pub async fn dispatch_delivery(&self, name: &str, body: &str) -> HandlerOutcome {
        match WebhookEvent::from_delivery(name, body) {
            Ok(event) => self.dispatch(event).await,
            Err(EventError::Unsupported { name, action }) => {
                info!(event = %name, action = %action, "Ignoring unsupported event");
                HandlerOutcome::Skipped {
                    repository: String::new(),
                    reason: format!("unsupported event {name}.{action}"),
                }
            }
            Err(e) => {
                error!(event = name, error = %e, "Failed to decode delivery");
                HandlerOutcome::Failed {
                    repository: String::new(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Handles a decoded event using the current time.
    pub async fn dispatch(&self, event: WebhookEvent) -> HandlerOutcome {
        self.dispatch_at(event, Utc::now()).await
    }

    /// Handles a decoded event as of `now`.
    ///
    /// Errors never escape; they are logged and reported as
    /// [`HandlerOutcome::Failed`].
    pub async fn dispatch_at(&self, event: WebhookEvent, now: DateTime<Utc>) -> HandlerOutcome {
        let name = event.name();
        let repository = repository_name(&event);

        let result: Result<HandlerOutcome, BotError> = match &event {
            WebhookEvent::IssuesOpened(payload) | WebhookEvent::IssuesReopened(payload) => {
                self.auto_label.handle_issue(payload).await
            }
            WebhookEvent::IssuesLabeled(payload) => self.auto_label.handle_labeled(payload).await,
            WebhookEvent::Push(payload) => self.release_please.handle_push(payload).await,
            WebhookEvent::ReleasePublished(payload) => {
                self.release_please.handle_release(payload).await
            }
            WebhookEvent::PullRequestLabeled(payload) => {
                self.release_please.handle_labeled(payload).await
            }
            WebhookEvent::BuildResult(payload) => self
                .buildcop
                .handle(payload, now)
                .await
                .map(|(repo, summary)| HandlerOutcome::Triaged {
                    repository: repo.full_name(),
                    summary,
                })
                .map_err(BotError::from),
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(event = name, repo = %repository, error = %e, "Handler failed");
                HandlerOutcome::Failed {
                    repository,
                    error: e.to_string(),
                }
            }
        }
    }
}

fn repository_name(event: &WebhookEvent) -> String {
    match event {
        WebhookEvent::IssuesOpened(p)
        | WebhookEvent::IssuesReopened(p)
        | WebhookEvent::IssuesLabeled(p) => p.repository.full_name.clone(),
        WebhookEvent::Push(p) => p.repository.full_name.clone(),
        WebhookEvent::ReleasePublished(p) => p.repository.full_name.clone(),
        WebhookEvent::PullRequestLabeled(p) => p.repository.full_name.clone(),
        WebhookEvent::BuildResult(p) => p
            .repo_ref()
            .map(|repo| repo.full_name())
            .unwrap_or_default(),
    }
}
