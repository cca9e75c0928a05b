use thiserror::Error;

/// Errors raised while assembling an [`OutboundMessage`](crate::OutboundMessage).
#[derive(Debug, Error)]
pub enum CoreError {
    /// An address string was empty or structurally unusable.
    #[error("invalid email address '{0}'")]
    InvalidAddress(String),

    /// A metadata value could not be represented as JSON.
    #[error("metadata value for '{key}' is not JSON-serializable: {source}")]
    Metadata {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
