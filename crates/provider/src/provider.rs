use async_trait::async_trait;
use courier_core::{OutboundMessage, SendDefaults, SendResult};

use crate::error::ProviderError;

/// An email-sending backend.
///
/// Implementations must not keep per-message state: one backend instance is
/// shared across concurrent sends, and each send builds its own payload.
#[async_trait]
pub trait EmailBackend: Send + Sync + std::fmt::Debug {
    /// Returns the backend name (e.g. `"mailgun"`).
    fn name(&self) -> &str;

    /// Send one message and report the status of every recipient.
    ///
    /// The provider either accepts the whole message or the call fails;
    /// there is no partial success.
    async fn send(
        &self,
        message: &OutboundMessage,
        defaults: &SendDefaults,
    ) -> Result<SendResult, ProviderError>;
}
