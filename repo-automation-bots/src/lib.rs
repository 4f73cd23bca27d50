#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod auto_label;
pub mod buildcop;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod github;
pub mod release_please;
pub mod summary;
pub mod templates;

pub use auto_label::{AutoLabel, FileLabelMapSource, LabelMap, LabelMapSource};
pub use buildcop::{BuildCop, ParseError, TestIdentity, TestResult};
pub use config::{AutoLabelSettings, BotSettings, BuildCopSettings, ConfigError};
pub use dispatch::{Collaborators, Dispatcher};
pub use error::BotError;
pub use events::{EventError, WebhookEvent};
pub use github::{
    check_core_rate_limit, ensure_core_rate_limit, wait_if_needed, ConfigSource, GitHubError,
    IssueState, IssueTracker, NewIssue, OctocrabClient, RateLimitInfo, RepoRef, TrackingIssue,
};
pub use release_please::{ReleaseError, ReleasePlease, ReleasePleaseConfig, ReleasePrBuilder, ReleaseType};
pub use summary::{HandlerOutcome, TriageSummary};
pub use templates::{TemplateError, TemplateRenderer};
