//! Release strategies.

use super::ReleaseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Release strategy passed to the release PR builder.
///
/// Only the strategies inferred from a repository language have their own
/// variant. Any other name configured in `release-please.yml` is handed to
/// the builder as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseType {
    Node,
    Ruby,
    JavaYoshi,
    PhpYoshi,
    TerraformModule,
    Other(String),
}

impl ReleaseType {
    /// Infers the strategy from the language GitHub detected for the repo.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::NoLanguage`] when no language was detected and
    /// [`ReleaseError::UnknownLanguage`] when there is no matching strategy.
    pub fn from_language(language: Option<&str>) -> Result<Self, ReleaseError> {
        let language = language.ok_or(ReleaseError::NoLanguage)?;
        match language.to_lowercase().as_str() {
            "ruby" => Ok(Self::Ruby),
            "java" => Ok(Self::JavaYoshi),
            "typescript" | "javascript" => Ok(Self::Node),
            "php" => Ok(Self::PhpYoshi),
            "terraform-module" => Ok(Self::TerraformModule),
            _ => Err(ReleaseError::UnknownLanguage(language.to_string())),
        }
    }

    /// Name used by the release tooling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Node => "node",
            Self::Ruby => "ruby",
            Self::JavaYoshi => "java-yoshi",
            Self::PhpYoshi => "php-yoshi",
            Self::TerraformModule => "terraform-module",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ReleaseType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "node" => Self::Node,
            "ruby" => Self::Ruby,
            "java-yoshi" => Self::JavaYoshi,
            "php-yoshi" => Self::PhpYoshi,
            "terraform-module" => Self::TerraformModule,
            _ => Self::Other(name),
        }
    }
}

impl From<ReleaseType> for String {
    fn from(release_type: ReleaseType) -> Self {
        match release_type {
            ReleaseType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_from_language_case_insensitively() {
        assert_eq!(
            ReleaseType::from_language(Some("TypeScript")).unwrap(),
            ReleaseType::Node
        );
        assert_eq!(
            ReleaseType::from_language(Some("javascript")).unwrap(),
            ReleaseType::Node
        );
        assert_eq!(
            ReleaseType::from_language(Some("Java")).unwrap(),
            ReleaseType::JavaYoshi
        );
        assert_eq!(
            ReleaseType::from_language(Some("PHP")).unwrap(),
            ReleaseType::PhpYoshi
        );
        assert_eq!(
            ReleaseType::from_language(Some("Ruby")).unwrap(),
            ReleaseType::Ruby
        );
    }

    #[test]
    fn rejects_missing_or_unknown_language() {
        assert!(matches!(
            ReleaseType::from_language(None),
            Err(ReleaseError::NoLanguage)
        ));
        assert!(matches!(
            ReleaseType::from_language(Some("Go")),
            Err(ReleaseError::UnknownLanguage(lang)) if lang == "Go"
        ));
        // Configurable strategies are not inferred.
        assert!(ReleaseType::from_language(Some("Python")).is_err());
    }

    #[test]
    fn serde_names_match_display() {
        let parsed: ReleaseType = serde_yaml::from_str("java-yoshi").unwrap();
        assert_eq!(parsed, ReleaseType::JavaYoshi);
        assert_eq!(parsed.to_string(), "java-yoshi");
        assert_eq!(ReleaseType::TerraformModule.to_string(), "terraform-module");
    }

    #[test]
    fn other_strategies_pass_through() {
        let parsed: ReleaseType = serde_yaml::from_str("java-bom").unwrap();
        assert_eq!(parsed, ReleaseType::Other("java-bom".to_string()));
        assert_eq!(parsed.to_string(), "java-bom");
        assert_eq!(String::from(parsed), "java-bom");
    }
}
