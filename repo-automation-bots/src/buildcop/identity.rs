//! Test identities and the issue titles derived from them.

use serde::Serialize;

/// Title used when a build reports failure without per-test detail.
pub const EVERYTHING_FAILED_TITLE: &str = "The build failed";

/// Which test a result belongs to.
///
/// A build-level identity (no package, no test) stands for the whole build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TestIdentity {
    /// Package, module, or class the test lives in.
    pub package: Option<String>,

    /// Test name.
    pub test_case: Option<String>,
}

impl TestIdentity {
    /// Identity of a single test.
    pub fn test(package: Option<String>, test_case: impl Into<String>) -> Self {
        Self {
            package,
            test_case: Some(test_case.into()),
        }
    }

    /// Identity covering the whole build.
    #[must_use]
    pub fn build() -> Self {
        Self {
            package: None,
            test_case: None,
        }
    }

    /// Returns true if this identity stands for the whole build.
    #[must_use]
    pub fn is_build(&self) -> bool {
        self.test_case.is_none()
    }

    /// Issue title for this identity: `"<pkg>: <test> failed"`.
    #[must_use]
    pub fn title(&self) -> String {
        match (&self.package, &self.test_case) {
            (_, None) => EVERYTHING_FAILED_TITLE.to_string(),
            (Some(package), Some(test)) => format!("{package}: {test} failed"),
            (None, Some(test)) => format!("{test} failed"),
        }
    }

    /// Join key used to match issues across runs.
    #[must_use]
    pub fn key(&self) -> String {
        normalize(&self.title())
    }

    /// Returns true if an issue title refers to this identity.
    ///
    /// Matches the exact title, the normalized title, or a title that
    /// extends the normalized title with extra words. Extra words that end
    /// in `failed` name a different test whose name starts with this one.
    #[must_use]
    pub fn matches_title(&self, title: &str) -> bool {
        let expected = self.title();
        if title == expected {
            return true;
        }

        let key = normalize(&expected);
        let candidate = normalize(title);
        candidate == key
            || candidate
                .strip_prefix(key.as_str())
                .is_some_and(|rest| rest.starts_with(' ') && !rest.ends_with(" failed"))
    }
}

/// Lowercases and collapses every run of punctuation or whitespace into a
/// single space.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_formats() {
        let go = TestIdentity::test(Some("spanner/spanner_snippets".to_string()), "TestSample");
        assert_eq!(go.title(), "spanner/spanner_snippets: TestSample failed");

        let bare = TestIdentity::test(None, "test_index");
        assert_eq!(bare.title(), "test_index failed");

        assert_eq!(TestIdentity::build().title(), "The build failed");
    }

    #[test]
    fn normalize_is_case_and_punctuation_insensitive() {
        assert_eq!(
            normalize("Spanner/Spanner_Snippets:  TestSample FAILED"),
            "spanner spanner_snippets testsample failed"
        );
        assert_eq!(normalize("a.b.c"), normalize("A  B-C"));
    }

    #[test]
    fn matches_exact_normalized_and_prefixed_titles() {
        let id = TestIdentity::test(Some("storage/buckets".to_string()), "TestBucketLock");

        assert!(id.matches_title("storage/buckets: TestBucketLock failed"));
        assert!(id.matches_title("Storage/Buckets: testbucketlock failed"));
        assert!(id.matches_title("storage/buckets: TestBucketLock failed (again)"));
        assert!(!id.matches_title("storage/buckets: TestBucketLockExtra failed"));
        assert!(!id.matches_title("storage/buckets: TestBucketLock failedX"));
    }

    #[test]
    fn longer_test_name_with_failed_in_it_is_another_test() {
        let id = TestIdentity::test(Some("pkg".to_string()), "returns data");

        assert!(!id.matches_title("pkg: returns data failed gracefully failed"));
        assert!(id.matches_title("pkg: returns data failed (flaky)"));
    }
}
