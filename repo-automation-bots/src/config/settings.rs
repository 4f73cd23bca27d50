//! Service-wide bot settings.

use crate::config::ConfigError;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Settings shared by every delivery handled by the process.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotSettings {
    /// Build failure triage settings.
    pub buildcop: BuildCopSettings,

    /// Repository label mapping settings.
    pub auto_label: AutoLabelSettings,
}

/// Settings for the build failure triage bot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildCopSettings {
    /// Closed issues younger than this many days are reopened as flaky.
    #[serde(default = "default_flaky_window_days")]
    pub flaky_window_days: u32,

    /// Link rendered into every newly opened issue.
    #[serde(default = "default_doc_url")]
    pub doc_url: String,

    /// Module prefixes trimmed from package names before building titles.
    #[serde(default = "default_package_prefixes")]
    pub package_prefixes: Vec<String>,
}

impl Default for BuildCopSettings {
    fn default() -> Self {
        Self {
            flaky_window_days: default_flaky_window_days(),
            doc_url: default_doc_url(),
            package_prefixes: default_package_prefixes(),
        }
    }
}

/// Settings for the auto-label bot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutoLabelSettings {
    /// Bucket holding the repository to label mapping.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Object name of the mapping inside the bucket.
    #[serde(default = "default_object")]
    pub object: String,

    /// Maximum concurrent label requests during a backfill.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for AutoLabelSettings {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            object: default_object(),
            concurrency: default_concurrency(),
        }
    }
}

pub(crate) fn default_flaky_window_days() -> u32 {
    10
}

pub(crate) fn default_doc_url() -> String {
    "https://github.com/googleapis/repo-automation-bots/tree/master/packages/buildcop".to_string()
}

pub(crate) fn default_package_prefixes() -> Vec<String> {
    vec!["github.com/GoogleCloudPlatform/golang-samples/".to_string()]
}

pub(crate) fn default_bucket() -> String {
    "devrel-prod-settings".to_string()
}

pub(crate) fn default_object() -> String {
    "public_repos.json".to_string()
}

pub(crate) fn default_concurrency() -> usize {
    5
}

/// Environment variable naming the settings file.
pub const SETTINGS_PATH_ENV: &str = "REPO_BOTS_SETTINGS";

impl BotSettings {
    /// Loads and validates settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, cannot be parsed, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading bot settings");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        settings.validate(path)?;
        Ok(settings)
    }

    /// Loads settings from the file named by `REPO_BOTS_SETTINGS`, falling
    /// back to defaults when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the variable is set but the file is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(SETTINGS_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                info!("No settings file configured, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let path_str = path.display().to_string();

        if self.buildcop.flaky_window_days == 0 {
            return Err(ConfigError::ValidationError {
                path: path_str,
                message: "flaky-window-days must be at least 1".to_string(),
            });
        }

        if Url::parse(&self.buildcop.doc_url).is_err() {
            return Err(ConfigError::ValidationError {
                path: path_str,
                message: format!("doc-url is not a valid URL: {}", self.buildcop.doc_url),
            });
        }

        if self.auto_label.concurrency == 0 {
            return Err(ConfigError::ValidationError {
                path: path_str,
                message: "concurrency must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
