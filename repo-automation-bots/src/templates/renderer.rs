//! Template renderer.

use super::{
    BUILD_STATUS_TEMPLATE, DUPLICATE_TEMPLATE, FLAKY_AGAIN_TEMPLATE, FLAKY_TEMPLATE,
    LOCKED_NOTE_TEMPLATE, NEW_ISSUE_TEMPLATE, PASSED_TEMPLATE, STALE_NOTE_TEMPLATE,
};
use handlebars::{no_escape, Handlebars};
use serde_json::{json, Value};

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs
}

/// Build metadata rendered at the bottom of most messages.
#[derive(Debug, Clone, Copy)]
pub struct BuildStatus<'a> {
    /// Commit SHA the build ran against.
    pub commit: &'a str,

    /// Link to the build log.
    pub build_url: &'a str,

    /// Whether the test passed in this build.
    pub passed: bool,
}

/// Why a new issue was opened instead of reusing a previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueNote {
    /// The previous issue is locked.
    Locked { number: u64 },

    /// The previous issue was closed outside the flaky window.
    Stale { number: u64, window_days: u32 },
}

/// Renderer for the messages the bots post on issues.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the `commit`/`buildURL`/`status` block.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_build_status(&self, status: &BuildStatus<'_>) -> Result<String, super::TemplateError> {
        let data = json!({
            "commit": status.commit,
            "build_url": status.build_url,
            "status": if status.passed { "passed" } else { "failed" },
        });

        self.render_template(BUILD_STATUS_TEMPLATE, &data)
    }

    /// Renders the body of a freshly opened failure issue.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_new_issue(
        &self,
        doc_url: &str,
        status: &BuildStatus<'_>,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "doc_url": doc_url,
            "build_status": self.render_build_status(status)?,
        });

        self.render_template(NEW_ISSUE_TEMPLATE, &data)
    }

    /// Renders the body of a new issue that replaces a previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_note(
        &self,
        note: IssueNote,
        status: &BuildStatus<'_>,
    ) -> Result<String, super::TemplateError> {
        let build_status = self.render_build_status(status)?;
        match note {
            IssueNote::Locked { number } => self.render_template(
                LOCKED_NOTE_TEMPLATE,
                &json!({ "number": number, "build_status": build_status }),
            ),
            IssueNote::Stale {
                number,
                window_days,
            } => self.render_template(
                STALE_NOTE_TEMPLATE,
                &json!({
                    "number": number,
                    "window_days": window_days,
                    "build_status": build_status,
                }),
            ),
        }
    }

    /// Renders the comment posted when a closed issue is reopened.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_flaky_again(&self, status: &BuildStatus<'_>) -> Result<String, super::TemplateError> {
        let data = json!({ "build_status": self.render_build_status(status)? });
        self.render_template(FLAKY_AGAIN_TEMPLATE, &data)
    }

    /// Renders the comment posted when a build both passed and failed a test.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_flaky(&self, status: &BuildStatus<'_>) -> Result<String, super::TemplateError> {
        let data = json!({ "build_status": self.render_build_status(status)? });
        self.render_template(FLAKY_TEMPLATE, &data)
    }

    /// Renders the comment posted before closing an issue for a passing test.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_passed(&self, status: &BuildStatus<'_>) -> Result<String, super::TemplateError> {
        let data = json!({
            "commit": status.commit,
            "build_url": status.build_url,
        });
        self.render_template(PASSED_TEMPLATE, &data)
    }

    /// Renders the comment posted on a duplicate before closing it.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_duplicate(&self, canonical: u64) -> Result<String, super::TemplateError> {
        self.render_template(DUPLICATE_TEMPLATE, &json!({ "number": canonical }))
    }

    /// Renders a template with the given data.
    fn render_template(&self, template: &str, data: &Value) -> Result<String, super::TemplateError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
