//! Handler outcome types.

use super::TriageSummary;
use serde::Serialize;

/// Result of handling one webhook delivery.
///
/// Handlers never propagate errors to the host; failures end up here.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandlerOutcome {
    /// A build report was triaged.
    Triaged {
        /// Repository full name.
        repository: String,
        /// Actions taken.
        summary: TriageSummary,
    },

    /// Issues were labeled.
    Labeled {
        /// Repository full name.
        repository: String,
        /// Number of issues that received the label.
        issues_labeled: usize,
    },

    /// A release PR build was requested.
    ReleaseTriggered {
        /// Repository full name.
        repository: String,
        /// Release strategy used.
        release_type: String,
        /// Whether a GitHub release was also requested.
        github_release: bool,
    },

    /// The delivery required no work.
    Skipped {
        /// Repository full name.
        repository: String,
        /// Reason for skipping.
        reason: String,
    },

    /// Handling failed.
    Failed {
        /// Repository full name.
        repository: String,
        /// Error message.
        error: String,
    },
}

impl HandlerOutcome {
    /// Returns true if the delivery failed, or was triaged with failed actions.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        match self {
            Self::Failed { .. } => true,
            Self::Triaged { summary, .. } => summary.has_failures(),
            _ => false,
        }
    }
}
