//! Message templates rendered with Handlebars.
//!
//! Downstream tooling and people parse these messages, so the rendered text
//! must stay byte-for-byte stable.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, BuildStatus, IssueNote, TemplateRenderer};

pub(crate) const BUILD_STATUS_TEMPLATE: &str =
    "commit: {{commit}}\nbuildURL: {{build_url}}\nstatus: {{status}}";

pub(crate) const NEW_ISSUE_TEMPLATE: &str = "This test failed!\n\nTo configure my behavior, see [the Build Cop Bot documentation]({{doc_url}}).\n\nIf I'm commenting on this issue too often, add the `buildcop: quiet` label and\nI will stop commenting.\n\n---\n\n{{build_status}}";

pub(crate) const LOCKED_NOTE_TEMPLATE: &str =
    "Note: #{{number}} was also for this test, but it is locked\n\n----\n\n{{build_status}}";

pub(crate) const STALE_NOTE_TEMPLATE: &str = "Note: #{{number}} was also for this test, but it was closed more than {{window_days}} days ago. So, I didn't mark it flaky.\n\n----\n\n{{build_status}}";

pub(crate) const FLAKY_AGAIN_TEMPLATE: &str = "Oops! Looks like this issue is still flaky. :grimacing:\n\nI reopened the issue, but a human will need to close it again.\n\n---\n\n{{build_status}}";

pub(crate) const FLAKY_TEMPLATE: &str = "Looks like this issue is flaky. :worried:\n\nI'm going to leave this open and stop commenting.\n\nA human should fix and close this.\n\n---\n\n{{build_status}}";

pub(crate) const PASSED_TEMPLATE: &str =
    "Test passed for commit {{commit}} ({{build_url}})! Closing this issue.";

pub(crate) const DUPLICATE_TEMPLATE: &str = "Closing as a duplicate of #{{number}}";
