//! Per-repository `release-please.yml`.

use super::ReleaseType;
use crate::config::ConfigError;
use serde::Deserialize;

/// Options read from `.github/release-please.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePleaseConfig {
    /// Branch whose pushes trigger a release PR.
    #[serde(default = "default_primary_branch")]
    pub primary_branch: String,

    /// Labels applied to the release PR.
    #[serde(default)]
    pub release_labels: Option<Vec<String>>,

    /// Release strategy. Inferred from the repo language when absent.
    #[serde(default)]
    pub release_type: Option<ReleaseType>,

    /// Package name. Defaults to the repository name.
    #[serde(default)]
    pub package_name: Option<String>,

    /// Also create the GitHub release after a release PR merges.
    #[serde(default, rename = "handleGHRelease")]
    pub handle_gh_release: bool,

    /// Bump the minor version for breaking changes before 1.0.
    #[serde(default)]
    pub bump_minor_pre_major: bool,
}

fn default_primary_branch() -> String {
    "master".to_string()
}

impl Default for ReleasePleaseConfig {
    fn default() -> Self {
        Self {
            primary_branch: default_primary_branch(),
            release_labels: None,
            release_type: None,
            package_name: None,
            handle_gh_release: false,
            bump_minor_pre_major: false,
        }
    }
}

impl ReleasePleaseConfig {
    /// Parses the file contents.
    ///
    /// Returns `Ok(None)` for an empty file, which leaves the bot disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::YamlError`] if the file is not valid YAML or
    /// has fields of the wrong type.
    pub fn parse(raw: &str, source: &str) -> Result<Option<Self>, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let value: serde_yaml::Value =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::YamlError {
                path: source.to_string(),
                source: e,
            })?;
        if value.is_null() {
            return Ok(None);
        }

        serde_yaml::from_value(value)
            .map(Some)
            .map_err(|e| ConfigError::YamlError {
                path: source.to_string(),
                source: e,
            })
    }

    /// Package name, falling back to `repo_name`.
    #[must_use]
    pub fn package_name_or<'a>(&'a self, repo_name: &'a str) -> &'a str {
        self.package_name.as_deref().unwrap_or(repo_name)
    }

    /// Release labels joined the way the builder expects them.
    #[must_use]
    pub fn joined_labels(&self) -> Option<String> {
        self.release_labels.as_ref().map(|labels| labels.join(","))
    }
}
