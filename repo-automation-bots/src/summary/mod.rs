//! Per-delivery summary types.

mod outcome;
mod triage_summary;

pub use outcome::HandlerOutcome;
pub use triage_summary::TriageSummary;
