//! Service configuration.
//!
//! Settings are read once per process from a TOML file. Per-repository
//! configuration (release-please options, label mappings) is fetched per
//! delivery by the bots that need it.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{AutoLabelSettings, BotSettings, BuildCopSettings, SETTINGS_PATH_ENV};
