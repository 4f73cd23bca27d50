//! Normalized test results.

use super::identity::TestIdentity;
use crate::templates::BuildStatus;
use serde::Serialize;

/// Rendered in place of missing build metadata.
pub const UNKNOWN: &str = "unknown";

/// Whether a test passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
}

/// Build the results came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Commit SHA.
    pub commit: String,

    /// Link to the build log.
    pub build_url: String,
}

impl BuildInfo {
    /// Builds metadata from optional payload fields.
    #[must_use]
    pub fn new(commit: Option<&str>, build_url: Option<&str>) -> Self {
        Self {
            commit: commit.filter(|c| !c.is_empty()).unwrap_or(UNKNOWN).to_string(),
            build_url: build_url
                .filter(|u| !u.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string(),
        }
    }

    /// Status block for a result with the given outcome.
    #[must_use]
    pub fn status(&self, passed: bool) -> BuildStatus<'_> {
        BuildStatus {
            commit: &self.commit,
            build_url: &self.build_url,
            passed,
        }
    }
}

/// Outcome of one test in one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    /// Which test.
    pub identity: TestIdentity,

    /// Pass or fail.
    pub outcome: Outcome,

    /// Failure message or log excerpt, when reported.
    pub failure_message: Option<String>,

    /// Build metadata.
    pub build: BuildInfo,
}

impl TestResult {
    /// Returns true if the test passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}
