//! Repository to label mapping.

use crate::config::ConfigError;
use crate::github::RepoRef;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct LabelMapFile {
    #[serde(default)]
    repos: Vec<LabelMapEntry>,
}

#[derive(Debug, Deserialize)]
struct LabelMapEntry {
    repo: String,
    github_label: String,
}

/// Lookup table from `owner/repo` to the label applied to its issues.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    by_repo: HashMap<String, String>,
}

impl LabelMap {
    /// Parses the JSON mapping file.
    ///
    /// An empty file yields an empty map. When a repository is listed more
    /// than once, the first entry wins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::JsonError`] for malformed JSON.
    pub fn from_json(raw: &str, source: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            info!(source, "Label map is empty");
            return Ok(Self::default());
        }

        let file: LabelMapFile = serde_json::from_str(raw).map_err(|e| ConfigError::JsonError {
            path: source.to_string(),
            source: e,
        })?;

        let mut by_repo = HashMap::with_capacity(file.repos.len());
        for entry in file.repos {
            by_repo.entry(entry.repo).or_insert(entry.github_label);
        }

        debug!(repos = by_repo.len(), "Loaded label map");
        Ok(Self { by_repo })
    }

    /// Label for `repo`, if it is mapped.
    #[must_use]
    pub fn lookup(&self, repo: &RepoRef) -> Option<&str> {
        self.by_repo.get(&repo.full_name()).map(String::as_str)
    }

    /// Number of mapped repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_repo.len()
    }

    /// Returns true if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_repo.is_empty()
    }
}

/// Storage holding the label mapping file.
#[async_trait]
pub trait LabelMapSource: Send + Sync {
    /// Downloads `object` from `bucket` as text.
    async fn load(&self, bucket: &str, object: &str) -> Result<String, ConfigError>;
}

/// Reads mapping files from a local directory laid out as `<root>/<bucket>/<object>`.
#[derive(Debug, Clone)]
pub struct FileLabelMapSource {
    root: PathBuf,
}

impl FileLabelMapSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl LabelMapSource for FileLabelMapSource {
    async fn load(&self, bucket: &str, object: &str) -> Result<String, ConfigError> {
        let path = self.root.join(bucket).join(object);
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::IoError {
                path: path.display().to_string(),
                source: e,
            })
    }
}
