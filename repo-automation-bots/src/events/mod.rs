//! Inbound webhook events.
//!
//! Deliveries are decoded once into the closed [`WebhookEvent`] set so that
//! the dispatcher can match on them exhaustively.

mod error;
mod payload;

pub use error::EventError;
pub use payload::{
    Account, BuildResultPayload, IssueDetails, IssuePayload, Label, Named, PullRequestDetails,
    PullRequestPayload, PushPayload, ReleasePayload, Repository,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Event name used for CI build result submissions.
pub const BUILD_RESULT_EVENT: &str = "pubsub.message";

/// Every event the bots react to.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    /// `issues.opened`
    IssuesOpened(IssuePayload),
    /// `issues.reopened`
    IssuesReopened(IssuePayload),
    /// `issues.labeled`
    IssuesLabeled(IssuePayload),
    /// `push`
    Push(PushPayload),
    /// `release.published`
    ReleasePublished(ReleasePayload),
    /// `pull_request.labeled`
    PullRequestLabeled(PullRequestPayload),
    /// A CI build result.
    BuildResult(BuildResultPayload),
}

impl WebhookEvent {
    /// Decodes a delivery from its event name (the `X-GitHub-Event` header,
    /// or [`BUILD_RESULT_EVENT`]) and JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Unsupported`] for events no bot handles and
    /// [`EventError::InvalidPayload`] for malformed bodies.
    pub fn from_delivery(name: &str, body: &str) -> Result<Self, EventError> {
        let value: Value = serde_json::from_str(body).map_err(|e| EventError::InvalidPayload {
            name: name.to_string(),
            source: e,
        })?;
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match (name, action.as_str()) {
            ("issues", "opened") => Ok(Self::IssuesOpened(decode(name, value)?)),
            ("issues", "reopened") => Ok(Self::IssuesReopened(decode(name, value)?)),
            ("issues", "labeled") => Ok(Self::IssuesLabeled(decode(name, value)?)),
            ("push", _) => Ok(Self::Push(decode(name, value)?)),
            ("release", "published") => Ok(Self::ReleasePublished(decode(name, value)?)),
            ("pull_request", "labeled") => Ok(Self::PullRequestLabeled(decode(name, value)?)),
            (BUILD_RESULT_EVENT, _) => Ok(Self::BuildResult(decode(name, value)?)),
            _ => Err(EventError::Unsupported {
                name: name.to_string(),
                action,
            }),
        }
    }

    /// Dotted event name, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::IssuesOpened(_) => "issues.opened",
            Self::IssuesReopened(_) => "issues.reopened",
            Self::IssuesLabeled(_) => "issues.labeled",
            Self::Push(_) => "push",
            Self::ReleasePublished(_) => "release.published",
            Self::PullRequestLabeled(_) => "pull_request.labeled",
            Self::BuildResult(_) => BUILD_RESULT_EVENT,
        }
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: Value) -> Result<T, EventError> {
    serde_json::from_value(value).map_err(|e| EventError::InvalidPayload {
        name: name.to_string(),
        source: e,
    })
}
