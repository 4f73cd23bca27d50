//! Webhook event error types.

use thiserror::Error;

/// Errors that can occur while decoding a delivery.
#[derive(Debug, Error)]
pub enum EventError {
    /// No bot handles this event/action pair.
    #[error("Unsupported event: {name}.{action}")]
    Unsupported { name: String, action: String },

    /// The payload did not match the event's expected shape.
    #[error("Invalid {name} payload: {source}")]
    InvalidPayload {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
