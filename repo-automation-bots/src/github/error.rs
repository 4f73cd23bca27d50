//! GitHub API error types.

use thiserror::Error;

/// Errors returned by the GitHub capability interface.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Permission denied.
    #[error("Permission denied: no write access to {repo}")]
    PermissionDenied { repo: String },

    /// A request failed outside the octocrab client.
    #[error("GitHub request failed: {0}")]
    Request(String),
}

impl GitHubError {
    /// Returns true if the error is a 404 from the API.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api(e) => {
                let msg = e.to_string().to_lowercase();
                msg.contains("404") || msg.contains("not found")
            }
            _ => false,
        }
    }

    /// Returns true if the error indicates missing write access.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Api(e) => {
                let msg = e.to_string().to_lowercase();
                msg.contains("403") || msg.contains("forbidden") || msg.contains("permission")
            }
            Self::PermissionDenied { .. } => true,
            Self::Request(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_detect_permission_denied() {
        assert!(GitHubError::PermissionDenied {
            repo: "test/repo".to_string()
        }
        .is_permission_denied());

        assert!(!GitHubError::Request("boom".to_string()).is_permission_denied());
        assert!(!GitHubError::Request("boom".to_string()).is_not_found());
    }
}
